//! # SIMS Tile Compression Scheme
//!
//! A compressed stream starts with a 2 byte little-endian header holding the
//! size of the body that follows (the header itself excluded).
//! The body is a sequence of instructions, selected by the leading tag bits.
//!
//! ```text
//!         MSB      LSB
//!          │        │
//!          ▼        ▼
//!         0ooo oooo  oooo llll
//!         ▲
//!     LZ──┘
//! ```
//!
//! Copy `llll + 2` (2..=17) bytes from `ooooooooooo` (1..=2047) bytes before the cursor.
//!
//! ```text
//!         10nn nnnn  [n + 1 bytes]
//!         ▲▲
//!    RAW──┘│
//!          0
//! ```
//!
//! Emit the following `n + 1` (1..=64) bytes verbatim.
//!
//! ```text
//!         110u urrr  [u + 1 bytes]
//!         111u urrr  rrrr rrrr  [u + 1 bytes]
//!         ▲▲▲
//!    RLE──┘│└─ 0: short form, 1: long form
//!          1
//! ```
//!
//! Emit the `u + 1` (1..=4) byte unit `r + 2` times. The short form counts
//! 2..=9 repetitions. The long form has an 11 bit field but the decompressor
//! on the target only accepts up to 2047 repetitions, so neither side goes
//! beyond that.
//!
//! The encoding does not include the uncompressed size.
//! The decoder MUST know the payload size.
//!
//! # Optimal Parsing
//!
//! The input is walked back to front. For every position the cheapest
//! instruction is picked given the already known cost of encoding the rest of
//! the input, so the resulting stream is the smallest one the instruction set
//! can express. On equal cost LZ wins over RLE, RLE over raw, and the shorter
//! candidate of a kind over the longer one.

#[macro_use]
extern crate log;

mod decoder;
mod encoder;
mod error;
mod matches;
mod parse;
mod window;

pub use decoder::{decompress, Decoder};
pub use encoder::{write_bitstream, Encoder};
pub use error::{Error, Result};
pub use matches::{Match, Opcode, Tag};
pub use parse::CostTable;

/// pretty name of the format
pub const NAME: &str = "SIMS compression";
/// file extension of compressed data
pub const EXTENSION: &str = "sims";

/// size of the compressed size header
pub const HEADER_LEN: usize = 2;
/// one 8x8 tile at 4 bits per pixel
pub const TILE_SIZE: usize = 32;

/// how far back an LZ copy may reach
pub const MAX_OFFSET: usize = 0b111_1111_1111;
const MIN_LZ_LENGTH: usize = 2;
const MAX_LZ_LENGTH: usize = 0b1111 + MIN_LZ_LENGTH;
const MAX_RAW_LENGTH: usize = 0b11_1111 + 1;
const MAX_RLE_UNIT: usize = 0b11 + 1;
const MIN_RLE_REPEATS: usize = 2;
const MAX_SHORT_RLE_REPEATS: usize = 0b111 + MIN_RLE_REPEATS;
/// cap imposed by the decompressor, not by the 11 bit field
const MAX_RLE_REPEATS: usize = 2047;

/// Compress `data` into a header and instruction stream.
///
/// Inputs whose compressed body exceeds 64KiB cannot be described by the
/// header; like the tools this format comes from, only the low 16 bits of the
/// size are stored. Use [`try_compress`] to reject such inputs instead.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let table = CostTable::build(data);
    let body_len = table.total_cost();
    if body_len > u16::MAX as usize {
        warn!("compressed size {body_len} does not fit the header, truncating");
    }
    encoder::to_vec(&table, body_len as u16)
}

/// Like [`compress`], but fails when the compressed size does not fit the header.
pub fn try_compress(data: &[u8]) -> Result<Vec<u8>> {
    let table = CostTable::build(data);
    let body_len = encoder::header_for(&table)?;
    Ok(encoder::to_vec(&table, body_len))
}

/// Compress the first `num_tiles` tiles of `source`.
pub fn compress_tiles(source: &[u8], num_tiles: usize) -> Result<Vec<u8>> {
    let len = num_tiles * TILE_SIZE;
    if source.len() < len {
        return Err(Error::NotEnoughTiles {
            tiles: num_tiles,
            available: source.len() / TILE_SIZE,
        });
    }
    debug!("compressing {num_tiles} tiles ({len} bytes)");
    try_compress(&source[..len])
}

/// Copy a compressed stream into a caller provided buffer, returning the bytes written.
pub fn copy_to_destination(compressed: &[u8], destination: &mut [u8]) -> Result<usize> {
    if compressed.len() > destination.len() {
        return Err(Error::BufferTooSmall {
            needed: compressed.len(),
            capacity: destination.len(),
        });
    }
    destination[..compressed.len()].copy_from_slice(compressed);
    Ok(compressed.len())
}
