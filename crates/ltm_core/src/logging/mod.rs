//! Logging infrastructure for ltm-merge.
//!
//! This module provides:
//! - Per-merge loggers with file + callback dual output
//! - Compact mode keeping per-entry detail out of the console
//! - Tail buffer for abort diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use ltm_core::logging::{LogConfig, MergeLogger};
//!
//! let logger = MergeLogger::new("part1+part2", ".logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Align");
//! logger.info("Second recording starts at 5000000");
//! logger.success("Aligned at 1067804");
//! ```

mod merge_logger;
mod types;

pub use merge_logger::MergeLogger;
pub(crate) use merge_logger::sanitize_filename;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}
