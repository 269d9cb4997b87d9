use crate::{
    MAX_LZ_LENGTH, MAX_OFFSET, MAX_RAW_LENGTH, MAX_RLE_REPEATS, MAX_RLE_UNIT,
    MAX_SHORT_RLE_REPEATS, MIN_LZ_LENGTH, MIN_RLE_REPEATS,
};
use std::{fmt, io};

/// One instruction of the compressed stream, borrowing its payload from the input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Match<'a> {
    Raw(&'a [u8]),
    Rle { unit: &'a [u8], repetitions: u16 },
    Lz { offset: u16, length: u8 },
}

/// Instruction kind selected by the tag bits of the first byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    Lz,
    Raw,
    ShortRle,
    LongRle,
}

impl Tag {
    #[inline(always)]
    pub fn of(byte: u8) -> Tag {
        match byte >> 5 {
            0b000..=0b011 => Tag::Lz,
            0b100 | 0b101 => Tag::Raw,
            0b110 => Tag::ShortRle,
            _ => Tag::LongRle,
        }
    }
}

/// Fixed part of an encoded instruction, at most 2 bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    bytes: [u8; 2],
    len: u8,
}

impl Opcode {
    fn one(byte: u8) -> Self {
        Opcode {
            bytes: [byte, 0],
            len: 1,
        }
    }

    fn two(first: u8, second: u8) -> Self {
        Opcode {
            bytes: [first, second],
            len: 2,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl<'a> Match<'a> {
    /// `None` unless `data` holds 1..=64 bytes.
    pub fn raw(data: &'a [u8]) -> Option<Self> {
        (1..=MAX_RAW_LENGTH)
            .contains(&data.len())
            .then_some(Match::Raw(data))
    }

    /// `None` unless `unit` holds 1..=4 bytes repeated 2..=2047 times.
    pub fn rle(unit: &'a [u8], repetitions: usize) -> Option<Self> {
        ((1..=MAX_RLE_UNIT).contains(&unit.len())
            && (MIN_RLE_REPEATS..=MAX_RLE_REPEATS).contains(&repetitions))
        .then_some(Match::Rle {
            unit,
            repetitions: repetitions as u16,
        })
    }

    /// `None` unless `offset` is 1..=2047 and `length` is 2..=17.
    pub fn lz(offset: usize, length: usize) -> Option<Self> {
        ((1..=MAX_OFFSET).contains(&offset) && (MIN_LZ_LENGTH..=MAX_LZ_LENGTH).contains(&length))
            .then_some(Match::Lz {
                offset: offset as u16,
                length: length as u8,
            })
    }

    /// how many input bytes this instruction reproduces
    #[inline(always)]
    pub fn bytes_encoded(&self) -> usize {
        match *self {
            Match::Raw(data) => data.len(),
            Match::Rle { unit, repetitions } => unit.len() * repetitions as usize,
            Match::Lz { length, .. } => length as usize,
        }
    }

    /// how many output bytes this instruction occupies
    #[inline(always)]
    pub fn encoded_size(&self) -> usize {
        self.opcode().len as usize + self.payload().len()
    }

    #[inline(always)]
    pub fn tag(&self) -> Tag {
        match *self {
            Match::Raw(_) => Tag::Raw,
            Match::Rle { repetitions, .. } if repetitions as usize <= MAX_SHORT_RLE_REPEATS => {
                Tag::ShortRle
            }
            Match::Rle { .. } => Tag::LongRle,
            Match::Lz { .. } => Tag::Lz,
        }
    }

    pub fn opcode(&self) -> Opcode {
        match *self {
            Match::Raw(data) => Opcode::one(0b1000_0000 | (data.len() - 1) as u8),
            Match::Rle { unit, repetitions } => {
                let unit_bits = ((unit.len() - 1) as u8) << 3;
                let count = repetitions - MIN_RLE_REPEATS as u16;
                if self.tag() == Tag::ShortRle {
                    Opcode::one(0b1100_0000 | unit_bits | count as u8)
                } else {
                    Opcode::two(
                        0b1110_0000 | unit_bits | (count >> 8) as u8,
                        (count & 0xFF) as u8,
                    )
                }
            }
            Match::Lz { offset, length } => Opcode::two(
                (offset >> 4) as u8,
                ((offset & 0xF) << 4) as u8 | (length - MIN_LZ_LENGTH as u8),
            ),
        }
    }

    /// bytes following the opcode verbatim
    pub fn payload(&self) -> &'a [u8] {
        match *self {
            Match::Raw(data) => data,
            Match::Rle { unit, .. } => unit,
            Match::Lz { .. } => &[],
        }
    }

    pub fn encode_into<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.opcode().as_bytes())?;
        writer.write_all(self.payload())
    }
}

impl fmt::Display for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Match::Raw(data) => write!(f, "Raw: {} bytes", data.len()),
            Match::Rle { unit, repetitions } => {
                write!(f, "RLE: {repetitions} repeats of length {}", unit.len())
            }
            Match::Lz { offset, length } => write!(f, "LZ: offset {offset}, length {length}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Match, Tag};
    use crate::tests::setup;

    fn encode(m: Match<'_>) -> String {
        let mut out = vec![];
        m.encode_into(&mut out).unwrap();
        assert_eq!(out.len(), m.encoded_size());
        hex::encode(out)
    }

    #[test]
    fn test_raw_encoding() {
        setup();
        assert_eq!(encode(Match::raw(&[0x42]).unwrap()), "8042");
        let data = [0x11; 64];
        let m = Match::raw(&data).unwrap();
        assert_eq!(m.encoded_size(), 65);
        assert_eq!(&encode(m)[..4], "bf11");
        assert!(Match::raw(&[]).is_none());
        assert!(Match::raw(&[0; 65]).is_none());
    }

    #[test]
    fn test_rle_encoding() {
        setup();
        // short form, 2..=9 repeats
        assert_eq!(encode(Match::rle(&[0xAA], 2).unwrap()), "c0aa");
        assert_eq!(encode(Match::rle(&[0xAA], 9).unwrap()), "c7aa");
        assert_eq!(
            encode(Match::rle(&[1, 2, 3, 4], 5).unwrap()),
            "db01020304"
        );
        // long form, 10..=2047 repeats
        assert_eq!(encode(Match::rle(&[0xAA], 10).unwrap()), "e008aa");
        assert_eq!(encode(Match::rle(&[1, 2], 1050).unwrap()), "ec180102");
        assert_eq!(encode(Match::rle(&[0xAA], 2047).unwrap()), "e7fdaa");

        assert!(Match::rle(&[0xAA], 1).is_none());
        assert!(Match::rle(&[0xAA], 2048).is_none());
        assert!(Match::rle(&[0; 5], 2).is_none());
        assert!(Match::rle(&[], 2).is_none());
    }

    #[test]
    fn test_lz_encoding() {
        setup();
        assert_eq!(encode(Match::lz(7, 5).unwrap()), "0073");
        assert_eq!(encode(Match::lz(1, 2).unwrap()), "0010");
        assert_eq!(encode(Match::lz(2047, 17).unwrap()), "7fff");
        assert!(Match::lz(0, 2).is_none());
        assert!(Match::lz(2048, 2).is_none());
        assert!(Match::lz(1, 1).is_none());
        assert!(Match::lz(1, 18).is_none());
    }

    #[test]
    fn test_tag_of_encoded_byte() {
        setup();
        let unit = [0x10, 0x20];
        for m in [
            Match::raw(&unit).unwrap(),
            Match::rle(&unit, 3).unwrap(),
            Match::rle(&unit, 300).unwrap(),
            Match::lz(2047, 17).unwrap(),
            Match::lz(1, 2).unwrap(),
        ] {
            assert_eq!(Tag::of(m.opcode().as_bytes()[0]), m.tag(), "{m}");
        }
        for (byte, tag) in [
            (0x00, Tag::Lz),
            (0x7F, Tag::Lz),
            (0x80, Tag::Raw),
            (0xBF, Tag::Raw),
            (0xC0, Tag::ShortRle),
            (0xDF, Tag::ShortRle),
            (0xE0, Tag::LongRle),
            (0xFF, Tag::LongRle),
        ] {
            assert_eq!(Tag::of(byte), tag, "{byte:02x}");
        }
    }

    #[test]
    fn test_bytes_encoded() {
        setup();
        assert_eq!(Match::raw(&[1, 2, 3]).unwrap().bytes_encoded(), 3);
        assert_eq!(Match::rle(&[1, 2, 3], 10).unwrap().bytes_encoded(), 30);
        assert_eq!(Match::lz(100, 17).unwrap().bytes_encoded(), 17);
    }
}
