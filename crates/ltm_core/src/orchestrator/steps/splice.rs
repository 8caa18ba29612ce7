//! Splice step - joins both logs and commits the output container.
//!
//! This is the only phase that writes to the output path. The inputs are
//! never rewritten; their extraction directories are released once the
//! output is committed.

use std::fs;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::MergeStep;
use crate::orchestrator::types::{Context, MergePhase, MergeState, SpliceOutput, StepOutcome};
use crate::timeline::splice;

pub struct SpliceStep;

impl SpliceStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpliceStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeStep for SpliceStep {
    fn name(&self) -> &str {
        "Splice"
    }

    fn phase(&self) -> MergePhase {
        MergePhase::Splice
    }

    fn description(&self) -> &str {
        "Join both frame logs and write the merged recording"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if let Some(parent) = ctx.request.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StepError::io_error("creating output directory", e))?;
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome> {
        let (first, second) = state
            .handles()
            .ok_or_else(|| StepError::precondition_failed("Inputs are not open"))?;
        let reconciled = state
            .reconciled
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Reconcile has not run"))?;

        let (merged, summary) = splice(
            state.arena.get(first)?,
            state.arena.get(second)?,
            reconciled,
            &ctx.request.output,
        )?;

        if summary.second_converted {
            ctx.logger.info(&format!(
                "Converted second log to output rate {}",
                summary.rate
            ));
        }
        ctx.logger.info(&format!(
            "Joined {} + {} entries ({}, {})",
            summary.first_entries,
            summary.second_entries,
            summary.rate,
            if summary.variable_framerate { "variable" } else { "constant" }
        ));

        let handle = state.arena.insert(merged);
        state.arena.commit(handle, &ctx.request.output)?;
        ctx.logger
            .info(&format!("Wrote {}", ctx.request.output.display()));

        state.splice = Some(SpliceOutput {
            output_path: ctx.request.output.clone(),
            summary,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &MergeState) -> StepResult<()> {
        if state.splice.is_none() {
            return Err(StepError::invalid_output("Splice summary not recorded"));
        }
        if !ctx.request.output.is_file() {
            return Err(StepError::invalid_output(format!(
                "Output file missing: {}",
                ctx.request.output.display()
            )));
        }
        Ok(())
    }
}
