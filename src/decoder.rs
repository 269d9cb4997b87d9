use crate::error::{Error, Result};
use crate::matches::Tag;
use crate::{HEADER_LEN, MAX_RLE_REPEATS, MIN_LZ_LENGTH, MIN_RLE_REPEATS};
use std::io;

const HISTORY_LEN: usize = 1 << 11; // 2k, one more than the largest offset
const HISTORY_MASK: usize = HISTORY_LEN - 1;

/// Reference decompressor writing the reproduced bytes into `writer`.
///
/// LZ copies are made one byte at a time from the output history, so a copy
/// may overlap the bytes it produces.
pub struct Decoder<W> {
    history: Vec<u8>,
    written: usize,
    expected: usize,
    scratch: Vec<u8>,
    writer: W,
}

/// Reads the stream one field at a time, failing on truncation.
struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[inline(always)]
    fn byte(&mut self) -> Result<u8> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or(Error::Truncated { position: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    #[inline(always)]
    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let bytes = self
            .input
            .get(self.pos..end)
            .ok_or(Error::Truncated {
                position: self.input.len(),
            })?;
        self.pos = end;
        Ok(bytes)
    }
}

impl<W: io::Write> Decoder<W> {
    /// `expected` is the uncompressed size, which the stream does not record.
    pub fn new(writer: W, expected: usize) -> Decoder<W> {
        Decoder {
            history: vec![0; HISTORY_LEN],
            written: 0,
            expected,
            scratch: Vec::new(),
            writer,
        }
    }

    #[inline(always)]
    fn push(&mut self, byte: u8) {
        self.history[self.written & HISTORY_MASK] = byte;
        self.written += 1;
        self.scratch.push(byte);
    }

    fn reserve(&self, n: usize) -> Result<()> {
        let actual = self.written + n;
        if actual > self.expected {
            return Err(Error::Overrun {
                expected: self.expected,
                actual,
            });
        }
        Ok(())
    }

    /// Decode one instruction into the history and scratch buffer.
    fn step(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
        let b = cursor.byte()?;
        match Tag::of(b) {
            Tag::Raw => {
                let data = cursor.bytes((b & 0b0011_1111) as usize + 1)?;
                trace!("raw: {} bytes", data.len());
                self.reserve(data.len())?;
                for &x in data {
                    self.push(x);
                }
            }
            tag @ (Tag::ShortRle | Tag::LongRle) => {
                let unit_len = ((b >> 3) & 0b11) as usize + 1;
                let count = if tag == Tag::ShortRle {
                    (b & 0b111) as usize
                } else {
                    ((b & 0b111) as usize) << 8 | cursor.byte()? as usize
                };
                let repetitions = count + MIN_RLE_REPEATS;
                if repetitions > MAX_RLE_REPEATS {
                    return Err(Error::RepeatOverflow { repetitions });
                }
                let unit = cursor.bytes(unit_len)?;
                trace!("rle: {repetitions} repeats of length {unit_len}");
                self.reserve(unit_len * repetitions)?;
                for _ in 0..repetitions {
                    for &x in unit {
                        self.push(x);
                    }
                }
            }
            Tag::Lz => {
                let low = cursor.byte()?;
                let offset = (b as usize) << 4 | (low >> 4) as usize;
                let length = (low & 0xF) as usize + MIN_LZ_LENGTH;
                trace!("lz: offset {offset}, length {length}");
                if offset == 0 || offset > self.written {
                    return Err(Error::InvalidOffset {
                        offset,
                        written: self.written,
                    });
                }
                self.reserve(length)?;
                for _ in 0..length {
                    let x = self.history[(self.written - offset) & HISTORY_MASK];
                    self.push(x);
                }
            }
        }
        Ok(())
    }

    /// Decode a whole stream, header included, returning the writer.
    pub fn decode(mut self, input: &[u8]) -> Result<W> {
        let mut cursor = Cursor { input, pos: 0 };
        let header = cursor.bytes(HEADER_LEN)?;
        let body_len = u16::from_le_bytes([header[0], header[1]]) as usize;
        debug!("decoding {body_len} bytes into {}", self.expected);

        while self.written < self.expected {
            self.scratch.clear();
            self.step(&mut cursor)?;
            self.writer.write_all(&self.scratch)?;
        }

        let actual = cursor.pos - HEADER_LEN;
        if actual != body_len {
            return Err(Error::LengthMismatch {
                header: body_len,
                actual,
            });
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Decompress `input` into exactly `expected` bytes.
pub fn decompress(input: &[u8], expected: usize) -> Result<Vec<u8>> {
    Decoder::new(Vec::with_capacity(expected), expected).decode(input)
}
