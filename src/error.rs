use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// header or instruction runs past the end of the stream
    #[error("malformed bitstream: truncated at byte {position}")]
    Truncated { position: usize },

    /// LZ copy from before the start of the output
    #[error("malformed bitstream: offset {offset} at output byte {written}")]
    InvalidOffset { offset: usize, written: usize },

    #[error("malformed bitstream: {repetitions} repetitions exceed 2047")]
    RepeatOverflow { repetitions: usize },

    #[error("malformed bitstream: output reaches {actual} bytes, expected {expected}")]
    Overrun { expected: usize, actual: usize },

    #[error("malformed bitstream: header says {header} bytes, decoded {actual}")]
    LengthMismatch { header: usize, actual: usize },

    #[error("compressed size {size} does not fit the 16 bit header")]
    InputTooLarge { size: usize },

    #[error("{tiles} tiles requested, only {available} available")]
    NotEnoughTiles { tiles: usize, available: usize },

    #[error("destination buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },
}

impl Error {
    /// whether the error comes from a corrupt compressed stream
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. }
                | Error::InvalidOffset { .. }
                | Error::RepeatOverflow { .. }
                | Error::Overrun { .. }
                | Error::LengthMismatch { .. }
        )
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => e,
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
