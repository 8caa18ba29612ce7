//! Align step - finds where the second recording takes over.
//!
//! Opens both inputs, checks that they use integer rates, and searches
//! forward from the first recording's end for the clock value whose state
//! matches the second recording's startup seed. A previously persisted
//! alignment is verified instead of searched again.

use crate::frames::{FrameError, Rate};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::MergeStep;
use crate::orchestrator::types::{AlignOutput, Context, MergePhase, MergeState, StepOutcome};
use crate::timeline::{find_alignment, verify_alignment, TimelineError};

pub struct AlignStep;

impl AlignStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AlignStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeStep for AlignStep {
    fn name(&self) -> &str {
        "Align"
    }

    fn phase(&self) -> MergePhase {
        MergePhase::Align
    }

    fn description(&self) -> &str {
        "Find the splice point between the two recordings"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let request = &ctx.request;
        for path in [&request.first, &request.second] {
            if !path.is_file() {
                return Err(StepError::file_not_found(path.display().to_string()));
            }
        }
        if request.output_is_input() {
            return Err(StepError::invalid_input(
                "Output path must differ from both inputs",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut MergeState) -> StepResult<StepOutcome> {
        let first = state.arena.open(&ctx.request.first)?;
        state.first = Some(first);
        let second = state.arena.open(&ctx.request.second)?;
        state.second = Some(second);

        let first_rec = state.arena.get(first)?;
        let second_rec = state.arena.get(second)?;
        ctx.logger.info(&format!(
            "First: {} (version {})",
            first_rec.display_name(),
            first_rec.version()?
        ));
        ctx.logger.info(&format!(
            "Second: {} (version {})",
            second_rec.display_name(),
            second_rec.version()?
        ));

        for recording in [first_rec, second_rec] {
            let rate = recording.frame_rate()?.rate;
            if !rate.is_integer() {
                return Err(StepError::UnsupportedRate(
                    FrameError::UnsupportedRateConfiguration {
                        from: rate,
                        to: Rate::integer(rate.num),
                    },
                ));
            }
        }

        let first_end = first_rec.end_micros()?;
        let second_start = second_rec.start_micros()?;
        ctx.logger.info(&format!(
            "First ends at {}us, second starts at {}us",
            first_end, second_start
        ));

        let (alignment, reused) = match ctx.request.alignment {
            Some(alignment) => {
                ctx.logger.info("Verifying supplied alignment");
                verify_alignment(&alignment, first_end, second_start)?;
                (alignment, true)
            }
            None => {
                let window = ctx.settings.search.window;
                ctx.logger.info(&format!(
                    "Searching for state of {} from {} (window {}us)",
                    second_start, first_end, window
                ));
                let alignment = find_alignment(first_end, second_start, window).map_err(
                    |e| match e {
                        TimelineError::Search(search) => StepError::SpliceAlignmentFailed(search),
                        other => other.into(),
                    },
                )?;
                (alignment, false)
            }
        };

        ctx.logger.info(&format!(
            "Splice at {}us (state {}, +{}us after first end)",
            alignment.aligned,
            alignment.target_state(),
            alignment.delta()
        ));

        let artifact = if ctx.settings.merge.persist_alignment && !reused {
            let path = ctx.alignment_path();
            alignment
                .save(&path)
                .map_err(|e| StepError::io_error("saving alignment", e))?;
            ctx.logger
                .info(&format!("Saved alignment to {}", path.display()));
            Some(path)
        } else {
            None
        };

        state.align = Some(AlignOutput {
            target_state: alignment.target_state(),
            alignment,
            reused,
            artifact,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &MergeState) -> StepResult<()> {
        if state.handles().is_none() {
            return Err(StepError::invalid_output("Input recordings not opened"));
        }
        if state.alignment().is_none() {
            return Err(StepError::invalid_output("Alignment not recorded"));
        }
        Ok(())
    }
}
