//! ltm-core - RNG timeline search and movie splicing for ltm-merge.
//!
//! This crate holds all merge logic with no CLI dependencies:
//!
//! - [`rng`]: the elapsed-time seeded generator and its searches
//! - [`frames`]: frame logs, per-entry rate overrides, rate conversion
//! - [`movie`]: the `.ltm` container, its metadata, and open recordings
//! - [`timeline`]: alignment, stitching, reseeds, and splicing
//! - [`states`]: the replay-measured reseed interchange file
//! - [`orchestrator`]: the merge phases and their runner
//! - [`config`], [`logging`]: settings file and per-merge logs

pub mod config;
pub mod frames;
pub mod logging;
pub mod movie;
pub mod orchestrator;
pub mod rng;
pub mod states;
pub mod timeline;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
