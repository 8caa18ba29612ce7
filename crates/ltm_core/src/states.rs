//! The states interchange file.
//!
//! Measurements taken in the replay tool travel between merge phases as
//! plain text, one reseed per line:
//!
//! ```text
//! state,micros,seed_or_frame
//! ```
//!
//! Straight out of the instrumented replay the third column is the seed
//! and micros is relative to the recording start. After [`StatesFile::correct`]
//! micros is the exact absolute clock value; after the user replaces the
//! seed with the frame number observed at that clock value, the file feeds
//! [`StatesFile::to_reseed_points`].

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rng::{search_seed, SearchError};
use crate::timeline::ReseedPoint;

/// Errors reading or resolving a states file.
#[derive(Error, Debug)]
pub enum StatesError {
    #[error("Line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Line {line}: value {value} does not fit a {what}")]
    OutOfRange {
        line: usize,
        value: u64,
        what: &'static str,
    },

    #[error("Line {line}: time {micros} precedes the old start time {old_start}")]
    BeforeStart {
        line: usize,
        micros: u64,
        old_start: u64,
    },

    #[error("Line {line}: {source}")]
    Search {
        line: usize,
        #[source]
        source: SearchError,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for states file operations.
pub type StatesResult<T> = Result<T, StatesError>;

/// One line of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecord {
    pub state: u16,
    pub micros: u64,
    /// Seed before correction, frame number after the replay pass.
    pub tag: u64,
    /// 1-based source line.
    pub line: usize,
}

/// Parsed states file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatesFile {
    records: Vec<StateRecord>,
}

impl StatesFile {
    /// Parse file content. Blank lines are ignored.
    pub fn parse(content: &str) -> StatesResult<Self> {
        let mut records = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(StatesError::Malformed {
                    line: line_num,
                    message: format!("expected 3 comma-separated fields, got {}", fields.len()),
                });
            }

            let number = |field: &str, name: &str| -> StatesResult<u64> {
                field.parse().map_err(|_| StatesError::Malformed {
                    line: line_num,
                    message: format!("{} '{}' is not a non-negative integer", name, field),
                })
            };

            let state = number(fields[0], "state")?;
            let state = u16::try_from(state).map_err(|_| StatesError::OutOfRange {
                line: line_num,
                value: state,
                what: "16-bit state",
            })?;

            records.push(StateRecord {
                state,
                micros: number(fields[1], "micros")?,
                tag: number(fields[2], "seed/frame")?,
                line: line_num,
            });
        }

        Ok(Self { records })
    }

    pub fn load(path: impl AsRef<Path>) -> StatesResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| StatesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Render as lines joined by `\n`, no trailing newline.
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{},{},{}", r.state, r.micros, r.tag))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> StatesResult<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|source| StatesError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace relative, approximate micros with exact absolute ones.
    ///
    /// The first record is the startup seeding, which alignment already
    /// handles, and is dropped. Every other record gets the earliest micros
    /// at or after `micros + start_time` whose seed equals its third column.
    pub fn correct(&self, start_time: u64, window: u64) -> StatesResult<StatesFile> {
        let mut records = Vec::with_capacity(self.records.len().saturating_sub(1));

        for record in self.records.iter().skip(1) {
            let seed = u32::try_from(record.tag).map_err(|_| StatesError::OutOfRange {
                line: record.line,
                value: record.tag,
                what: "32-bit seed",
            })?;

            let micros = search_seed(seed, record.micros + start_time, window).map_err(|source| {
                StatesError::Search {
                    line: record.line,
                    source,
                }
            })?;

            records.push(StateRecord { micros, ..*record });
        }

        tracing::debug!("Corrected {} state records", records.len());
        Ok(StatesFile { records })
    }

    /// Map measured reseeds from the second recording's own timeline onto
    /// the merged one.
    pub fn to_reseed_points(&self, old_start: u64, new_start: u64) -> StatesResult<Vec<ReseedPoint>> {
        self.records
            .iter()
            .map(|record| {
                let micros = (record.micros + new_start)
                    .checked_sub(old_start)
                    .ok_or(StatesError::BeforeStart {
                        line: record.line,
                        micros: record.micros,
                        old_start,
                    })?;
                let entry_index = usize::try_from(record.tag).map_err(|_| StatesError::OutOfRange {
                    line: record.line,
                    value: record.tag,
                    what: "frame index",
                })?;
                Ok(ReseedPoint {
                    state: record.state,
                    micros,
                    entry_index,
                })
            })
            .collect()
    }
}
