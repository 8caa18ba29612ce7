//! Frame log error types.

use std::io;

use thiserror::Error;

use super::rate::Rate;

/// Errors that can occur while reading or rewriting a frame log.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Rate conversion between non-integer rates is not supported.
    #[error("Unsupported rate configuration {from} -> {to}: both rates must have denominator 1")]
    UnsupportedRateConfiguration { from: Rate, to: Rate },

    /// A rate with a zero numerator or denominator.
    #[error("Invalid rate {num}:{den}")]
    InvalidRate { num: u64, den: u64 },

    /// A rate token that does not read as `num:den`.
    #[error("Invalid rate token '{0}'")]
    InvalidRateToken(String),

    /// 1-based index outside the log.
    #[error("Entry {index} out of range (log has {len} entries)")]
    EntryOutOfRange { index: usize, len: usize },

    /// Operation needs at least one entry.
    #[error("Frame log is empty")]
    EmptyLog,

    /// Reading or writing the underlying stream failed.
    #[error("Frame log I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::EntryOutOfRange { index, len }
    }
}

/// Result type for frame log operations.
pub type FrameResult<T> = Result<T, FrameError>;
