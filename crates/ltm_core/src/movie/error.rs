//! Movie error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::arena::RecordingHandle;
use super::version::Version;
use crate::frames::FrameError;

/// Errors reading or writing the metadata member.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A required key is absent.
    #[error("Missing metadata field '{0}'")]
    MissingField(String),

    /// Neither the current key nor its legacy name is present.
    #[error("Missing metadata field '{primary}' (legacy fallback '{legacy}' also absent)")]
    MissingLegacyField { primary: String, legacy: String },

    /// A key holds a value of the wrong shape.
    #[error("Invalid value '{value}' for metadata field '{key}'")]
    InvalidValue { key: String, value: String },

    /// The document itself is malformed.
    #[error("Metadata parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl MetadataError {
    /// Create a missing field error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingField(key.into())
    }

    /// Create an invalid value error.
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Version ranking errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A minor or patch number has more than one digit, so the single-digit
    /// ordering cannot rank the pair.
    #[error("Cannot rank versions {first} and {second}: minor/patch numbers above 9 are not ordered")]
    Incomparable { first: Version, second: Version },
}

/// Errors opening, holding, or committing movie containers.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Filesystem or archive I/O failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A member every movie must carry is absent.
    #[error("Movie '{path}' has no '{member}' member")]
    MissingMember { path: PathBuf, member: String },

    /// The metadata member could not be read.
    #[error("Metadata error in '{path}': {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    /// The frame log member could not be read.
    #[error("Frame log error: {0}")]
    Frames(#[from] FrameError),

    /// The handle is not (or no longer) held by the arena.
    #[error("Unknown recording handle {0}")]
    UnknownHandle(RecordingHandle),
}

impl ContainerError {
    /// Create an I/O error with the path involved.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a missing member error.
    pub fn missing_member(path: impl Into<PathBuf>, member: impl Into<String>) -> Self {
        Self::MissingMember {
            path: path.into(),
            member: member.into(),
        }
    }
}

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Result type for version ranking.
pub type VersionResult<T> = Result<T, VersionError>;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
