//! Frame log model.
//!
//! The frame log is the `inputs` member of a movie: one line per recorded
//! frame, each an opaque input payload with an optional `T<num>:<den>|`
//! override declaring that frame's real-time duration.
//!
//! - [`FrameEntry`] / [`parse_override`]: one line and its override
//! - [`FrameLog`]: the indexed, 1-based sequence
//! - [`convert_rate`]: default-rate conversion preserving elapsed time

mod entry;
mod error;
mod log;
mod normalize;
mod rate;

pub use entry::{parse_override, render_override, FrameEntry, FIELD_DELIMITER};
pub use error::{FrameError, FrameResult};
pub use log::FrameLog;
pub use normalize::convert_rate;
pub use rate::{Rate, MICROS_PER_SECOND};
