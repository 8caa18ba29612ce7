//! Error types for the merge pipeline.
//!
//! Errors carry context that chains through layers:
//! Merge → Phase → Operation → Detail

use std::io;

use thiserror::Error;

use crate::frames::FrameError;
use crate::movie::{ContainerError, MetadataError, VersionError};
use crate::rng::SearchError;
use crate::states::StatesError;
use crate::timeline::TimelineError;

/// Top-level pipeline error with merge context.
///
/// Every variant leaves the merge aborted: no output has been committed.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A phase failed.
    #[error("Merge '{merge_name}' aborted at phase '{step_name}': {source}")]
    StepFailed {
        merge_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The request was rejected before any phase ran.
    #[error("Merge '{merge_name}' failed validation: {message}")]
    ValidationFailed { merge_name: String, message: String },

    /// Failed to set up the merge (work directory, logger).
    #[error("Merge '{merge_name}' setup failed: {message}")]
    SetupFailed { merge_name: String, message: String },
}

impl PipelineError {
    pub fn step_failed(
        merge_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            merge_name: merge_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn validation_failed(merge_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            merge_name: merge_name.into(),
            message: message.into(),
        }
    }

    pub fn setup_failed(merge_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            merge_name: merge_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a merge phase.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// No clock value after the first recording's end reproduces the
    /// second recording's startup state.
    #[error("No splice point found: {0}")]
    SpliceAlignmentFailed(#[source] SearchError),

    /// A rate outside the integer-rate model reached a merge boundary.
    #[error("Unsupported rate: {0}")]
    UnsupportedRate(#[source] FrameError),

    /// Input versions the single-digit ordering cannot rank.
    #[error("{0}")]
    VersionIncomparable(#[source] VersionError),

    #[error(transparent)]
    Timeline(TimelineError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    States(#[from] StatesError),

    #[error(transparent)]
    Frames(FrameError),

    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// An earlier phase did not leave what this one needs.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

impl From<FrameError> for StepError {
    fn from(err: FrameError) -> Self {
        match err {
            e @ FrameError::UnsupportedRateConfiguration { .. } => Self::UnsupportedRate(e),
            other => Self::Frames(other),
        }
    }
}

impl From<TimelineError> for StepError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::Frames(e) => e.into(),
            TimelineError::Version(e) => Self::VersionIncomparable(e),
            TimelineError::Metadata(e) => Self::Metadata(e),
            other => Self::Timeline(other),
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
