//! Bounded forward search from a target seed or state back to micros.
//!
//! The transform is not invertible, so the only way back is a linear scan
//! forward in time. Every search is bounded by a window; running out of
//! window yields [`SearchError::Exhausted`], never a guessed value.

use std::fmt;

use thiserror::Error;

use super::transform::{micros_to_seed, micros_to_state};

/// Default window for seed/state searches (10 seconds of micros).
pub const DEFAULT_SEARCH_WINDOW: u64 = 10_000_000;

/// Default window for stride-aligned searches.
pub const DEFAULT_ALIGNED_WINDOW: u64 = 100_000_000;

/// Default stride for aligned searches (one millisecond).
pub const DEFAULT_ALIGNED_STRIDE: u64 = 1_000;

/// Value a search is trying to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// Match the 32-bit seed exactly.
    Seed(u32),
    /// Match the 16-bit state index.
    State(u16),
}

impl SearchTarget {
    /// Whether `micros` reproduces this target.
    #[inline]
    pub fn matches(&self, micros: u64) -> bool {
        match *self {
            SearchTarget::Seed(seed) => micros_to_seed(micros) == seed,
            SearchTarget::State(state) => micros_to_state(micros) == state,
        }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTarget::Seed(seed) => write!(f, "seed {}", seed),
            SearchTarget::State(state) => write!(f, "state {}", state),
        }
    }
}

/// Errors from the search procedures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The window was scanned without a match. The space beyond the window
    /// is unexplored, so this does not mean no solution exists.
    #[error(
        "no micros reproducing {target} in window of {window} from {start} (stride {stride}); widen the window or move the start"
    )]
    Exhausted {
        target: SearchTarget,
        start: u64,
        window: u64,
        stride: u64,
    },

    /// A zero stride can never advance.
    #[error("search stride must be non-zero")]
    ZeroStride,
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Find the earliest micros in `[start, start + window)` producing `seed`.
pub fn search_seed(seed: u32, start: u64, window: u64) -> SearchResult<u64> {
    search(SearchTarget::Seed(seed), start, window, 1)
}

/// Find the earliest micros in `[start, start + window)` producing `state`.
pub fn search_state(state: u16, start: u64, window: u64) -> SearchResult<u64> {
    search(SearchTarget::State(state), start, window, 1)
}

/// Find the earliest `start + k * stride` (with `k * stride < window`)
/// producing `state`.
///
/// Callers that need absolute multiples of the stride should round `start`
/// up with `u64::next_multiple_of` first.
pub fn search_state_aligned(
    state: u16,
    start: u64,
    window: u64,
    stride: u64,
) -> SearchResult<u64> {
    search(SearchTarget::State(state), start, window, stride)
}

/// Shared forward scan.
pub fn search(target: SearchTarget, start: u64, window: u64, stride: u64) -> SearchResult<u64> {
    if stride == 0 {
        return Err(SearchError::ZeroStride);
    }

    let end = start.saturating_add(window);
    tracing::debug!(
        "Searching for {} in [{}, {}) with stride {}",
        target,
        start,
        end,
        stride
    );

    let found = (start..end)
        .step_by(stride as usize)
        .find(|&micros| target.matches(micros));

    match found {
        Some(micros) => {
            tracing::debug!("Found {} at {} (+{})", target, micros, micros - start);
            Ok(micros)
        }
        None => Err(SearchError::Exhausted {
            target,
            start,
            window,
            stride,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::transform::micros_to_state;

    #[test]
    fn state_search_finds_reference_alignment() {
        let target = micros_to_state(5_000_000);
        let found = search_state(target, 1_033_333, DEFAULT_SEARCH_WINDOW).unwrap();
        assert_eq!(found, 1_067_804);
    }

    #[test]
    fn state_search_returns_minimum_in_window() {
        let start = 250_000;
        let target = micros_to_state(start + 777);
        let found = search_state(target, start, 10_000).unwrap();

        assert_eq!(micros_to_state(found), target);
        let earliest = (start..start + 10_000)
            .find(|&m| micros_to_state(m) == target)
            .unwrap();
        assert_eq!(found, earliest);
    }

    #[test]
    fn state_search_includes_start() {
        let target = micros_to_state(42);
        assert_eq!(search_state(target, 42, 1).unwrap(), 42);
    }

    #[test]
    fn seed_search_finds_colliding_earlier_seed() {
        let target = micros_to_seed(2_000_123);
        let found = search_seed(target, 1_000_000, DEFAULT_SEARCH_WINDOW).unwrap();
        assert_eq!(found, 1_017_066);
        assert_eq!(micros_to_seed(found), target);
    }

    #[test]
    fn state_search_from_zero() {
        let target = micros_to_state(3_000_000);
        assert_eq!(search_state(target, 0, DEFAULT_SEARCH_WINDOW).unwrap(), 39_360);
    }

    #[test]
    fn exhausted_window_is_reported_not_guessed() {
        let start = 9_999;
        let seed = micros_to_seed(start) ^ 1;
        let err = search_seed(seed, start, 1).unwrap_err();
        assert!(matches!(err, SearchError::Exhausted { window: 1, .. }));

        let state = micros_to_state(start).wrapping_add(1);
        let err = search_state(state, start, 1).unwrap_err();
        assert_eq!(
            err,
            SearchError::Exhausted {
                target: SearchTarget::State(state),
                start,
                window: 1,
                stride: 1,
            }
        );
    }

    #[test]
    fn empty_window_is_exhausted() {
        assert!(search_state(38, 0, 0).is_err());
    }

    #[test]
    fn aligned_search_only_visits_stride_multiples() {
        let target = micros_to_state(7_000_000);
        let found =
            search_state_aligned(target, 1_000_000, DEFAULT_ALIGNED_WINDOW, DEFAULT_ALIGNED_STRIDE)
                .unwrap();
        assert_eq!(found, 7_000_000);
        assert_eq!((found - 1_000_000) % DEFAULT_ALIGNED_STRIDE, 0);
    }

    #[test]
    fn aligned_search_rejects_zero_stride() {
        assert_eq!(
            search_state_aligned(1, 0, 10, 0).unwrap_err(),
            SearchError::ZeroStride
        );
    }
}
