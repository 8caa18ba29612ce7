//! Reconcile step - picks the output base and sums the counters.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::MergeStep;
use crate::orchestrator::types::{Context, MergePhase, MergeState, ReconcileOutput, StepOutcome};
use crate::timeline::reconcile;

pub struct ReconcileStep;

impl ReconcileStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReconcileStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeStep for ReconcileStep {
    fn name(&self) -> &str {
        "Reconcile"
    }

    fn phase(&self) -> MergePhase {
        MergePhase::Reconcile
    }

    fn description(&self) -> &str {
        "Choose the newer input's metadata and sum rerecord counters"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome> {
        let (first, second) = state
            .handles()
            .ok_or_else(|| StepError::precondition_failed("Inputs are not open"))?;

        let (first, second) = (state.arena.get(first)?, state.arena.get(second)?);
        let reconciled = reconcile(first, second)?;

        let (first_version, second_version) = (first.version()?, second.version()?);
        if first_version != second_version {
            ctx.logger.warn(&format!(
                "Recorded with different versions: {} and {}",
                first_version, second_version
            ));
        }

        ctx.logger.info(&format!(
            "Output version {} taken from the {:?} input",
            reconciled.version, reconciled.base
        ));
        ctx.logger.info(&format!(
            "Rerecords {}, savestate frames {}",
            reconciled.rerecord_count, reconciled.savestate_frame_count
        ));

        state.reconcile = Some(ReconcileOutput {
            base: reconciled.base,
            version: reconciled.version.to_string(),
            rerecord_count: reconciled.rerecord_count,
            savestate_frame_count: reconciled.savestate_frame_count,
        });
        state.reconciled = Some(reconciled);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &MergeState) -> StepResult<()> {
        if state.reconciled.is_none() {
            return Err(StepError::invalid_output("Reconciled metadata not recorded"));
        }
        Ok(())
    }
}
