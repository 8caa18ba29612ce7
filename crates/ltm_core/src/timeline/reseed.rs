//! Interior reseed corrections.
//!
//! Games reseed their RNG from the clock at points other than startup
//! (soft resets, loads). Once the second recording is shifted onto the
//! merged timeline those reseeds read different clock values, so the entry
//! right before each one is stretched until the clock again produces the
//! state the original run saw.
//!
//! Corrections compose: each search starts where the previous corrections
//! leave the clock, and every later point moves by the running total.

use serde::{Deserialize, Serialize};

use crate::frames::FrameError;
use crate::movie::Recording;
use crate::rng::search_state;

use super::error::{TimelineError, TimelineResult};

/// A reseed the shifted recording must reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReseedPoint {
    /// State the original run saw at this reseed.
    pub state: u16,
    /// Clock value at the reseed on the shifted timeline, before corrections.
    pub micros: u64,
    /// 1-based index of the entry preceding the reseed.
    pub entry_index: usize,
}

/// Resolved correction for one reseed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReseedCorrection {
    pub entry_index: usize,
    pub state: u16,
    /// Clock value at the reseed once earlier corrections apply.
    pub start_micros: u64,
    /// First matching clock value at or after `start_micros`.
    pub resolved_micros: u64,
    /// Extra time given to the entry.
    pub added_micros: u64,
}

/// Work out every correction in order.
///
/// Entry indices must be strictly increasing.
pub fn plan_reseeds(points: &[ReseedPoint], window: u64) -> TimelineResult<Vec<ReseedCorrection>> {
    let mut corrections = Vec::with_capacity(points.len());
    let mut cumulative = 0u64;
    let mut previous_index = 0usize;

    for point in points {
        if point.entry_index == 0 {
            return Err(TimelineError::invalid_plan("entry indices are 1-based"));
        }
        if point.entry_index <= previous_index {
            return Err(TimelineError::invalid_plan(format!(
                "entry {} does not follow entry {}",
                point.entry_index, previous_index
            )));
        }
        previous_index = point.entry_index;

        let start = point.micros + cumulative;
        let resolved = search_state(point.state, start, window)?;
        let added = resolved - start;
        cumulative += added;

        tracing::debug!(
            "Reseed at entry {}: state {} from {} resolved at {} (+{}, total +{})",
            point.entry_index,
            point.state,
            start,
            resolved,
            added,
            cumulative
        );

        corrections.push(ReseedCorrection {
            entry_index: point.entry_index,
            state: point.state,
            start_micros: start,
            resolved_micros: resolved,
            added_micros: added,
        });
    }

    Ok(corrections)
}

/// Stretch the planned entries of `recording`.
///
/// Returns the total time added. Zero corrections leave their entry alone.
pub fn apply_reseeds(
    recording: &mut Recording,
    corrections: &[ReseedCorrection],
) -> TimelineResult<u64> {
    let default = recording.frame_rate()?.rate;
    let len = recording.frames.len();
    if let Some(last) = corrections.iter().map(|c| c.entry_index).max() {
        if last > len {
            return Err(FrameError::out_of_range(last, len).into());
        }
    }

    let mut total = 0u64;

    for correction in corrections.iter().filter(|c| c.added_micros > 0) {
        let entry = recording.frames.get_mut(correction.entry_index)?;
        let stretched = entry
            .effective_rate(default)
            .extended_by_micros(correction.added_micros);
        entry.set_rate(Some(stretched));
        total += correction.added_micros;
    }

    recording.metadata.set_variable_framerate(true);
    if total > 0 {
        recording.metadata.add_length_micros(total)?;
    }

    Ok(total)
}
