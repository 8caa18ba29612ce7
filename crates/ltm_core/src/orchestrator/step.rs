//! Merge step trait definition.

use super::errors::StepResult;
use super::types::{Context, MergePhase, MergeState, StepOutcome};

/// One phase of a merge.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the phase's work
/// 3. `validate_output` - Verify the phase recorded its output
///
/// Steps work on the recordings held in `MergeState`'s arena; only the
/// final phase writes the output container.
pub trait MergeStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Phase this step moves the merge into.
    fn phase(&self) -> MergePhase;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work and record results in `state`.
    ///
    /// Returns `StepOutcome::Skipped` when the request gives the step
    /// nothing to do (not an error).
    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome>;

    /// Validate outputs after a successful `execute`.
    fn validate_output(&self, ctx: &Context, state: &MergeState) -> StepResult<()>;

    /// Whether this step may be skipped. Default is `false`.
    fn is_optional(&self) -> bool {
        false
    }

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep;

    impl MergeStep for MockStep {
        fn name(&self) -> &str {
            "Mock"
        }

        fn phase(&self) -> MergePhase {
            MergePhase::Align
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut MergeState) -> StepResult<StepOutcome> {
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &MergeState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn MergeStep> = Box::new(MockStep);

        assert_eq!(step.name(), "Mock");
        assert_eq!(step.description(), "Mock");
        assert!(!step.is_optional());
    }
}
