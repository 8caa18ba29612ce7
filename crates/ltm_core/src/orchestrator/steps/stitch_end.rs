//! Stitch end step - extends the first recording to the splice point.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::MergeStep;
use crate::orchestrator::types::{Context, MergePhase, MergeState, StepOutcome};
use crate::timeline::stitch_end;

pub struct StitchEndStep;

impl StitchEndStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StitchEndStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeStep for StitchEndStep {
    fn name(&self) -> &str {
        "Stitch end"
    }

    fn phase(&self) -> MergePhase {
        MergePhase::StitchEnd
    }

    fn description(&self) -> &str {
        "Append a marker entry so the first recording ends on the splice point"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome> {
        let alignment = *state
            .alignment()
            .ok_or_else(|| StepError::precondition_failed("Align has not run"))?;
        let (first, _) = state
            .handles()
            .ok_or_else(|| StepError::precondition_failed("Inputs are not open"))?;

        let recording = state.arena.get_mut(first)?;
        let outcome = stitch_end(recording, &alignment)?;

        match (outcome.marker_index, outcome.marker_rate) {
            (Some(index), Some(rate)) => ctx.logger.info(&format!(
                "Appended marker entry {} at rate {} ({}us)",
                index, rate, outcome.delta_micros
            )),
            _ => ctx.logger.info("First recording already ends on the splice point"),
        }

        state.stitch = Some(outcome);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &MergeState) -> StepResult<()> {
        let (Some(alignment), Some((first, _))) = (state.alignment(), state.handles()) else {
            return Err(StepError::invalid_output("Merge state lost its inputs"));
        };
        let end = state.arena.get(first)?.end_micros()?;
        if end != alignment.aligned {
            return Err(StepError::invalid_output(format!(
                "First recording ends at {}, expected {}",
                end, alignment.aligned
            )));
        }
        Ok(())
    }
}
