//! Merge step implementations.
//!
//! Each step handles one phase of the merge.

mod align;
mod reconcile;
mod reseed;
mod splice;
mod stitch_end;

pub use align::AlignStep;
pub use reconcile::ReconcileStep;
pub use reseed::ReseedStep;
pub use splice::SpliceStep;
pub use stitch_end::StitchEndStep;
