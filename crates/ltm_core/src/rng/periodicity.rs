//! Periodicity analysis over the state sequence.
//!
//! Two scans characterise how the transform behaves over a window:
//! - the repeat-run detector looks for the point where the sequence
//!   starts reproducing itself (a full cycle);
//! - the duplicate-run detector looks for flat stretches where consecutive
//!   micros map to the same state.
//!
//! The core scans work on any state sequence so they can be exercised on
//! synthetic data; the `*_in_window` wrappers feed them from the transform.

use serde::{Deserialize, Serialize};

use super::transform::micros_to_state;

/// Anchors between debug progress lines in the nested repeat scan.
const PROGRESS_INTERVAL: u64 = 10_000;

/// A cycle found by the repeat-run detector, in sequence positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRun {
    /// Position the comparison started from.
    pub anchor: usize,
    /// Position where the sequence begins reproducing the anchor run.
    pub repeat_start: usize,
    /// Length of the repeated run (`repeat_start - anchor`).
    pub period: usize,
}

/// The longest run of consecutive equal states, in sequence positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRun {
    /// Position of the first value in the run.
    pub start: usize,
    /// Number of consecutive equal values.
    pub length: usize,
}

/// A cycle found in a micros window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrosRepeat {
    /// Micros the matching run starts at.
    pub anchor_micros: u64,
    /// Micros where the repetition begins.
    pub repeat_micros: u64,
    /// Cycle length in micros.
    pub period: u64,
}

/// A flat region found in a micros window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrosDuplicates {
    /// Micros the run starts at.
    pub start_micros: u64,
    /// Number of consecutive micros sharing one state.
    pub length: u64,
}

/// Find the earliest position `j > 0` where the sequence reproduces its own
/// prefix for at least `j` values (`states[j..2j] == states[0..j]`).
///
/// Every position holding the first value is a candidate and is checked on
/// its own, so a failed candidate never hides one that starts inside it.
pub fn find_repeat_run(states: &[u16]) -> Option<RepeatRun> {
    let first = *states.first()?;

    (1..=states.len() / 2)
        .filter(|&start| states[start] == first)
        .find(|&start| states[start..2 * start] == states[..start])
        .map(|start| RepeatRun {
            anchor: 0,
            repeat_start: start,
            period: start,
        })
}

/// Find the longest run of consecutive equal values.
///
/// Returns `None` when no value repeats back to back. Ties keep the
/// earliest run.
pub fn find_duplicate_run(states: &[u16]) -> Option<DuplicateRun> {
    longest_duplicate_run(states.iter().copied())
}

/// Streaming form of [`find_duplicate_run`]; tracks one running value and
/// one counter.
pub fn longest_duplicate_run<I>(values: I) -> Option<DuplicateRun>
where
    I: IntoIterator<Item = u16>,
{
    let mut values = values.into_iter();
    let mut current = values.next()?;
    let mut run_start = 0usize;
    let mut run_length = 1usize;
    let mut best = DuplicateRun {
        start: 0,
        length: 1,
    };

    for (offset, value) in values.enumerate() {
        let position = offset + 1;
        if value == current {
            run_length += 1;
            if run_length > best.length {
                best = DuplicateRun {
                    start: run_start,
                    length: run_length,
                };
            }
        } else {
            current = value;
            run_start = position;
            run_length = 1;
        }
    }

    (best.length > 1).then_some(best)
}

/// Scan `limit` anchors starting at `start` for a state cycle.
///
/// Each anchor is compared against the `limit` states following it, so the
/// cost is quadratic in `limit`. That nesting is this wrapper's choice; one
/// pass of [`find_repeat_run`] is linear.
pub fn find_repeats_in_window(start: u64, limit: u64) -> Option<MicrosRepeat> {
    if limit == 0 {
        return None;
    }

    let span = limit as usize;
    let states: Vec<u16> = (start..start.saturating_add(limit.saturating_mul(2)))
        .map(micros_to_state)
        .collect();

    for anchor in 0..span.min(states.len()) {
        if anchor as u64 % PROGRESS_INTERVAL == 0 && anchor > 0 {
            tracing::debug!(
                "Repeat scan at anchor {} ({}/{})",
                start + anchor as u64,
                anchor,
                limit
            );
        }

        let end = (anchor + span).min(states.len());
        if let Some(run) = find_repeat_run(&states[anchor..end]) {
            let anchor_micros = start + anchor as u64;
            return Some(MicrosRepeat {
                anchor_micros,
                repeat_micros: anchor_micros + run.repeat_start as u64,
                period: run.period as u64,
            });
        }
    }

    None
}

/// Find the longest flat run of states in `[start, start + limit)`.
pub fn find_duplicates_in_window(start: u64, limit: u64) -> Option<MicrosDuplicates> {
    let run = longest_duplicate_run((start..start.saturating_add(limit)).map(micros_to_state))?;
    Some(MicrosDuplicates {
        start_micros: start + run.start as u64,
        length: run.length as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_run_reports_longest_first_run() {
        let run = find_duplicate_run(&[5, 5, 5, 2, 2, 9]).unwrap();
        assert_eq!(run, DuplicateRun { start: 0, length: 3 });
    }

    #[test]
    fn duplicate_run_prefers_earliest_on_tie() {
        let run = find_duplicate_run(&[1, 4, 4, 7, 3, 3]).unwrap();
        assert_eq!(run, DuplicateRun { start: 1, length: 2 });
    }

    #[test]
    fn duplicate_run_finds_late_run() {
        let run = find_duplicate_run(&[1, 2, 3, 8, 8, 8, 8]).unwrap();
        assert_eq!(run, DuplicateRun { start: 3, length: 4 });
    }

    #[test]
    fn duplicate_run_none_without_repeats() {
        assert_eq!(find_duplicate_run(&[1, 2, 3, 1, 2, 3]), None);
        assert_eq!(find_duplicate_run(&[]), None);
        assert_eq!(find_duplicate_run(&[9]), None);
    }

    #[test]
    fn repeat_run_finds_period_three() {
        let run = find_repeat_run(&[1, 2, 3, 1, 2, 3, 1, 2, 3]).unwrap();
        assert_eq!(run.period, 3);
        assert_eq!(run.repeat_start, 3);
        assert_eq!(run.anchor, 0);
    }

    #[test]
    fn repeat_run_needs_full_period_of_evidence() {
        // The prefix starts repeating at 3 but the sequence ends early.
        assert_eq!(find_repeat_run(&[1, 2, 3, 1, 2]), None);
    }

    #[test]
    fn repeat_run_finds_cycle_overlapping_a_false_start() {
        // Candidates 2 and 5 fail part way; the cycle starts at 7.
        let states = [1, 2, 1, 9, 5, 1, 2, 1, 2, 1, 9, 5, 1, 2];
        assert_eq!(states[7..14], states[..7]);

        let run = find_repeat_run(&states).unwrap();
        assert_eq!(run.repeat_start, 7);
        assert_eq!(run.period, 7);
    }

    #[test]
    fn repeat_run_recovers_after_false_start() {
        // 1 at position 2 is a false start; the real cycle begins at 3.
        let run = find_repeat_run(&[1, 2, 1, 1, 2, 1, 1, 2]).unwrap();
        assert_eq!(run.repeat_start, 3);
        assert_eq!(run.period, 3);
    }

    #[test]
    fn repeat_run_period_one() {
        let run = find_repeat_run(&[4, 4, 4]).unwrap();
        assert_eq!(run.period, 1);
    }

    #[test]
    fn repeat_run_none_for_aperiodic() {
        assert_eq!(find_repeat_run(&[1, 2, 3, 4, 5, 6]), None);
        assert_eq!(find_repeat_run(&[]), None);
    }

    #[test]
    fn transform_has_no_flat_region_near_zero() {
        // Consecutive micros change the seed's high half, so states differ.
        assert_eq!(find_duplicates_in_window(0, 2_000), None);
    }

    #[test]
    fn empty_window_has_no_repeats() {
        assert_eq!(find_repeats_in_window(0, 0), None);
    }
}
