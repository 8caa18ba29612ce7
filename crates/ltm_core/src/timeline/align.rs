//! Timebase alignment between two recordings.
//!
//! The second recording was made from a clock that started at
//! `second_start`, so the game seeded its RNG with the state of that value.
//! Continuing the first recording past its end, the earliest clock value
//! with the same state is where the second recording can take over.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rng::{micros_to_state, search_state};

use super::error::{TimelineError, TimelineResult};

/// Result of aligning two recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// Start time of the second recording.
    pub second_start: u64,
    /// End time of the first recording.
    pub first_end: u64,
    /// Earliest micros `>= first_end` reproducing the state of `second_start`.
    pub aligned: u64,
}

impl Alignment {
    /// State both timelines must agree on at the splice.
    pub fn target_state(&self) -> u16 {
        micros_to_state(self.second_start)
    }

    /// Time to add after the first recording's end.
    pub fn delta(&self) -> u64 {
        self.aligned - self.first_end
    }

    /// Offset mapping second-recording times onto the merged timeline.
    pub fn shift(&self, micros: u64) -> Option<u64> {
        (micros + self.aligned).checked_sub(self.second_start)
    }

    /// Read a persisted alignment.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }

    /// Persist as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}

/// Search for the splice point.
pub fn find_alignment(first_end: u64, second_start: u64, window: u64) -> TimelineResult<Alignment> {
    let state = micros_to_state(second_start);
    let aligned = search_state(state, first_end, window)?;
    tracing::info!(
        "Aligned state {} of start {} at {} (+{} after end {})",
        state,
        second_start,
        aligned,
        aligned - first_end,
        first_end
    );
    Ok(Alignment {
        second_start,
        first_end,
        aligned,
    })
}

/// Check that a previously computed alignment still fits these times.
pub fn verify_alignment(
    alignment: &Alignment,
    first_end: u64,
    second_start: u64,
) -> TimelineResult<()> {
    if alignment.first_end != first_end {
        return Err(TimelineError::mismatch(format!(
            "first recording ends at {}, alignment was computed for {}",
            first_end, alignment.first_end
        )));
    }
    if alignment.second_start != second_start {
        return Err(TimelineError::mismatch(format!(
            "second recording starts at {}, alignment was computed for {}",
            second_start, alignment.second_start
        )));
    }
    if alignment.aligned < first_end {
        return Err(TimelineError::mismatch(format!(
            "aligned time {} precedes first recording end {}",
            alignment.aligned, first_end
        )));
    }
    if micros_to_state(alignment.aligned) != alignment.target_state() {
        return Err(TimelineError::mismatch(format!(
            "state at {} is {}, expected {}",
            alignment.aligned,
            micros_to_state(alignment.aligned),
            alignment.target_state()
        )));
    }
    Ok(())
}
