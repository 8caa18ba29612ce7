//! Timeline error types.

use thiserror::Error;

use crate::frames::FrameError;
use crate::movie::{MetadataError, VersionError};
use crate::rng::SearchError;

/// Errors while aligning, stretching, or splicing recordings.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// No matching micros inside the search window.
    #[error("RNG search failed: {0}")]
    Search(#[from] SearchError),

    /// A supplied alignment does not describe these recordings.
    #[error("Alignment mismatch: {0}")]
    AlignmentMismatch(String),

    /// Reseed points that cannot be applied in order.
    #[error("Invalid reseed plan: {0}")]
    InvalidReseedPlan(String),

    #[error(transparent)]
    Frames(#[from] FrameError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Version(#[from] VersionError),
}

impl TimelineError {
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::AlignmentMismatch(message.into())
    }

    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidReseedPlan(message.into())
    }
}

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;
