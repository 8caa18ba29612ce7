//! Timeline operations on recordings.
//!
//! These are the building blocks the merge pipeline runs in order:
//!
//! 1. [`find_alignment`]: where the first recording must end for the
//!    second one's startup seed to come out right
//! 2. [`stitch_end`]: extend the first recording to that point
//! 3. [`reconcile`]: pick the output base and sum counters
//! 4. [`plan_reseeds`] / [`apply_reseeds`]: keep interior reseeds on track
//! 5. [`splice`]: join the two logs
//!
//! All of them work on in-memory [`Recording`](crate::movie::Recording)s;
//! none touches the filesystem except [`Alignment::save`].

mod align;
mod error;
mod reseed;
mod splice;
mod stitch;

pub use align::{find_alignment, verify_alignment, Alignment};
pub use error::{TimelineError, TimelineResult};
pub use reseed::{apply_reseeds, plan_reseeds, ReseedCorrection, ReseedPoint};
pub use splice::{output_frame_rate, reconcile, splice, Reconciled, SpliceSummary};
pub use stitch::{stitch_end, StitchOutcome};
