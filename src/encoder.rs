use crate::error::{Error, Result};
use crate::parse::CostTable;
use crate::HEADER_LEN;
use std::io;

/// Buffers everything written to it; `finalize` compresses the whole input
/// into the inner writer.
pub struct Encoder<W> {
    buf: Vec<u8>,
    writer: W,
}

impl<W: io::Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Encoder {
            buf: Vec::new(),
            writer,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn finalize(mut self) -> Result<()> {
        debug!("compressing {} bytes", self.buf.len());
        let table = CostTable::build(&self.buf);
        write_bitstream(&table, &mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: io::Write> io::Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn header_for(table: &CostTable<'_>) -> Result<u16> {
    let size = table.total_cost();
    u16::try_from(size).map_err(|_| Error::InputTooLarge { size })
}

/// Write the size header followed by the chosen instructions.
pub fn write_bitstream<W: io::Write>(table: &CostTable<'_>, writer: &mut W) -> Result<()> {
    let header = header_for(table)?;
    write_stream(table, header, writer)?;
    Ok(())
}

fn write_stream<W: io::Write>(
    table: &CostTable<'_>,
    header: u16,
    writer: &mut W,
) -> io::Result<()> {
    writer.write_all(&header.to_le_bytes())?;
    for m in table.parse() {
        trace!("{m}");
        m.encode_into(writer)?;
    }
    Ok(())
}

pub(crate) fn to_vec(table: &CostTable<'_>, header: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + table.total_cost());
    // writing into a Vec cannot fail
    write_stream(table, header, &mut out).unwrap();
    out
}
