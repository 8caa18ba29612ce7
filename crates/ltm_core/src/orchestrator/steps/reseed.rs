//! Reseed step - keeps the second recording's interior reseeds on track.
//!
//! Points come either straight from the request or from a states file
//! whose times are still on the second recording's own timeline; the
//! latter are shifted by the alignment first. Optional: a request without
//! reseed data skips it.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::MergeStep;
use crate::orchestrator::types::{Context, MergePhase, MergeState, ReseedOutput, StepOutcome};
use crate::states::StatesFile;
use crate::timeline::{apply_reseeds, plan_reseeds, ReseedPoint};

pub struct ReseedStep;

impl ReseedStep {
    pub fn new() -> Self {
        Self
    }

    fn collect_points(ctx: &Context, state: &MergeState) -> StepResult<Vec<ReseedPoint>> {
        let Some(path) = &ctx.request.states_file else {
            return Ok(ctx.request.reseed_points.clone());
        };

        let alignment = state
            .alignment()
            .ok_or_else(|| StepError::precondition_failed("Align has not run"))?;
        let states = StatesFile::load(path)?;
        ctx.logger.info(&format!(
            "Read {} reseed records from {}",
            states.len(),
            path.display()
        ));
        Ok(states.to_reseed_points(alignment.second_start, alignment.aligned)?)
    }
}

impl Default for ReseedStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeStep for ReseedStep {
    fn name(&self) -> &str {
        "Reseed"
    }

    fn phase(&self) -> MergePhase {
        MergePhase::Reseed
    }

    fn description(&self) -> &str {
        "Stretch entries so interior reseeds reproduce their original states"
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.request.states_file.is_some() && !ctx.request.reseed_points.is_empty() {
            return Err(StepError::invalid_input(
                "Give reseed points or a states file, not both",
            ));
        }
        if let Some(path) = &ctx.request.states_file {
            if !path.is_file() {
                return Err(StepError::file_not_found(path.display().to_string()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome> {
        if !ctx.request.has_reseeds() {
            return Ok(StepOutcome::Skipped("No reseed points supplied".to_string()));
        }

        let points = Self::collect_points(ctx, state)?;
        if points.is_empty() {
            return Ok(StepOutcome::Skipped("Reseed list is empty".to_string()));
        }

        let corrections = plan_reseeds(&points, ctx.settings.search.window)?;
        for correction in &corrections {
            ctx.logger.detail(&format!(
                "entry {}: state {} from {} at {} (+{}us)",
                correction.entry_index,
                correction.state,
                correction.start_micros,
                correction.resolved_micros,
                correction.added_micros
            ));
        }

        let (_, second) = state
            .handles()
            .ok_or_else(|| StepError::precondition_failed("Inputs are not open"))?;
        let recording = state.arena.get_mut(second)?;
        let total = apply_reseeds(recording, &corrections)?;

        ctx.logger.info(&format!(
            "Applied {} reseed corrections, {}us added",
            corrections.len(),
            total
        ));

        state.reseed = Some(ReseedOutput {
            corrections,
            total_added_micros: total,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &MergeState) -> StepResult<()> {
        if state.reseed.is_none() {
            return Err(StepError::invalid_output("Reseed corrections not recorded"));
        }
        Ok(())
    }
}
