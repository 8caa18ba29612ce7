//! RNG model for the target's time-seeded generator.
//!
//! # Components
//!
//! - **transform**: micros → seed → state, bit-exact
//! - **search**: bounded forward search for a seed or state
//! - **periodicity**: cycle and flat-run detection over the state sequence
//! - **export**: CSV dumps of the seed sequence
//!
//! Everything here is pure and synchronous; nothing touches recordings.

mod export;
mod periodicity;
mod search;
mod transform;

pub use export::{export_seed_csv, write_seed_csv, SeedCsvLayout};
pub use periodicity::{
    find_duplicate_run, find_duplicates_in_window, find_repeat_run, find_repeats_in_window,
    longest_duplicate_run, DuplicateRun, MicrosDuplicates, MicrosRepeat, RepeatRun,
};
pub use search::{
    search, search_seed, search_state, search_state_aligned, SearchError, SearchResult,
    SearchTarget, DEFAULT_ALIGNED_STRIDE, DEFAULT_ALIGNED_WINDOW, DEFAULT_SEARCH_WINDOW,
};
pub use transform::{micros_to_seed, micros_to_state, seed_to_state};
