//! Runs a merge request end to end.
//!
//! The `MergeRunner` owns the per-merge setup the steps rely on: the work
//! directory, the merge logger, and the state with its recording arena.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::logging::{LogCallback, MergeLogger};
use crate::timeline::{Alignment, SpliceSummary, StitchOutcome};

use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, MergePhase, MergeRequest, MergeState, ProgressCallback};
use super::{create_merge_pipeline, create_prepare_pipeline, PipelineRunResult};

/// Which phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Align only, persisting the alignment for the replay workflow.
    Prepare,
    /// Every phase through the committed output.
    Full,
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub merge_name: String,
    pub phase: MergePhase,
    pub alignment: Option<Alignment>,
    pub alignment_artifact: Option<PathBuf>,
    pub stitch: Option<StitchOutcome>,
    pub reseed_added_micros: Option<u64>,
    pub summary: Option<SpliceSummary>,
    pub output_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl MergeReport {
    fn new(ctx: &Context, state: &MergeState, run: PipelineRunResult) -> Self {
        Self {
            merge_name: ctx.merge_name.clone(),
            phase: state.phase,
            alignment: state.alignment().copied(),
            alignment_artifact: state.align.as_ref().and_then(|a| a.artifact.clone()),
            stitch: state.stitch,
            reseed_added_micros: state.reseed.as_ref().map(|r| r.total_added_micros),
            summary: state.splice.as_ref().map(|s| s.summary.clone()),
            output_path: state.splice.as_ref().map(|s| s.output_path.clone()),
            log_path: ctx.logger.log_path().to_path_buf(),
            steps_completed: run.steps_completed,
            steps_skipped: run.steps_skipped,
        }
    }
}

/// Sets up and runs merges with one set of settings.
pub struct MergeRunner {
    settings: Settings,
}

impl MergeRunner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run `request` through the phases `mode` selects.
    ///
    /// Extraction directories are released before returning, whatever the
    /// outcome.
    pub fn run(
        &self,
        request: MergeRequest,
        mode: MergeMode,
        log_callback: Option<LogCallback>,
        progress_callback: Option<ProgressCallback>,
    ) -> PipelineResult<MergeReport> {
        let merge_name = request.default_name();

        if request.inputs_coincide() {
            return Err(PipelineError::validation_failed(
                &merge_name,
                "first and second recordings are the same file",
            ));
        }

        let paths = &self.settings.paths;
        let work_dir = PathBuf::from(&paths.work_folder).join(&merge_name);
        fs::create_dir_all(&work_dir).map_err(|e| {
            PipelineError::setup_failed(&merge_name, format!("Failed to create work directory: {}", e))
        })?;

        let logger = MergeLogger::new(
            &merge_name,
            &paths.logs_folder,
            self.settings.logging.to_log_config(),
            log_callback,
        )
        .map_err(|e| {
            PipelineError::setup_failed(&merge_name, format!("Failed to create logger: {}", e))
        })?;

        let mut ctx = Context::new(
            request,
            self.settings.clone(),
            &merge_name,
            work_dir,
            Arc::new(logger),
        );
        if let Some(callback) = progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        let mut state = MergeState::new(&merge_name, &paths.temp_root);

        let pipeline = match mode {
            MergeMode::Prepare => create_prepare_pipeline(),
            MergeMode::Full => create_merge_pipeline(),
        };

        ctx.logger.info(&format!("Starting merge: {}", merge_name));
        ctx.logger.info(&format!(
            "{} -> {}",
            ctx.request.first.display(),
            ctx.request.second.display()
        ));
        tracing::info!("Running {} phases for {}", pipeline.step_count(), merge_name);

        match pipeline.run(&ctx, &mut state) {
            Ok(run) => {
                let report = MergeReport::new(&ctx, &state, run);
                if let Some(output) = &report.output_path {
                    ctx.logger
                        .info(&format!("Merge committed: {}", output.display()));
                }
                Ok(report)
            }
            Err(e) => {
                ctx.logger.error(&format!("Merge aborted: {}", e));
                Err(e)
            }
        }
    }
}
