//! Merge orchestrator.
//!
//! A merge is a fixed sequence of phases run by a [`Pipeline`]. Each phase
//! validates its preconditions, does its work on the recordings held in the
//! [`MergeState`] arena, and records its output.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Align       (search or verify the splice point)
//!     ├── Step: Stitch end  (marker entry on the first recording)
//!     ├── Step: Reconcile   (output base, summed counters)
//!     ├── Step: Reseed      (optional interior corrections)
//!     └── Step: Splice      (join logs, commit output)
//! ```
//!
//! A failing phase aborts the merge: nothing is written to the output path
//! and every extraction directory is released.
//!
//! # Example
//!
//! ```no_run
//! use ltm_core::config::Settings;
//! use ltm_core::orchestrator::{MergeMode, MergeRequest, MergeRunner};
//!
//! let runner = MergeRunner::new(Settings::default());
//! let request = MergeRequest::new("part1.ltm", "part2.ltm", "merged.ltm");
//! let report = runner.run(request, MergeMode::Full, None, None).unwrap();
//! println!("Completed: {:?}", report.steps_completed);
//! ```

mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use runner::{MergeMode, MergeReport, MergeRunner};
pub use step::MergeStep;
pub use steps::{AlignStep, ReconcileStep, ReseedStep, SpliceStep, StitchEndStep};
pub use types::{
    AlignOutput, Context, MergePhase, MergeRequest, MergeState, ProgressCallback,
    ReconcileOutput, ReseedOutput, SpliceOutput, StepOutcome, ALIGNMENT_ARTIFACT,
};

/// Create the full merge pipeline with all phases in order.
pub fn create_merge_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(AlignStep::new())
        .with_step(StitchEndStep::new())
        .with_step(ReconcileStep::new())
        .with_step(ReseedStep::new())
        .with_step(SpliceStep::new())
}

/// Create the pipeline that only aligns.
///
/// Its persisted alignment drives the replay measurements that later
/// feed a full merge.
pub fn create_prepare_pipeline() -> Pipeline {
    Pipeline::new().with_step(AlignStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::frames::Rate;
    use crate::movie::{
        write_container, Recording, Version, ANNOTATIONS_MEMBER, CONFIG_MEMBER, INPUTS_MEMBER,
    };
    use crate::rng::micros_to_state;
    use crate::timeline::{Alignment, ReseedPoint};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    fn config(
        patch: u32,
        start_sec: u64,
        length_sec: u64,
        length_nsec: u64,
        rerecords: u64,
        savestates: u64,
        frames: usize,
    ) -> String {
        format!(
            "[General]\n\
             libtas_major_version=1\n\
             libtas_minor_version=4\n\
             libtas_patch_version={}\n\
             framerate_num=30\n\
             framerate_den=1\n\
             variable_framerate=false\n\
             initial_monotonic_time_sec={}\n\
             initial_monotonic_time_nsec=0\n\
             length_sec={}\n\
             length_nsec={}\n\
             rerecord_count={}\n\
             savestate_frame_count={}\n\
             frame_count={}\n",
            patch, start_sec, length_sec, length_nsec, rerecords, savestates, frames
        )
    }

    /// `count` lines `|<prefix>1|` .. `|<prefix>count|`.
    fn inputs(prefix: &str, count: usize) -> Vec<u8> {
        (1..=count)
            .map(|i| format!("|{}{}|\n", prefix, i))
            .collect::<String>()
            .into_bytes()
    }

    /// The declared length covers exactly the time the log plays for.
    fn assert_length_matches_log(recording: &Recording) {
        let rate = recording.frame_rate().unwrap();
        assert_eq!(
            recording.frames.elapsed_micros(rate.rate),
            recording.metadata.length_micros().unwrap()
        );
    }

    struct Fixture {
        dir: TempDir,
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        /// First plays 31 entries at 30fps and ends at 1_033_333us; second
        /// plays 60 entries from 5_000_000us, whose state reappears at
        /// 1_067_804us.
        fn new() -> Self {
            crate::logging::init_test_tracing();
            let dir = tempdir().unwrap();
            let first = dir.path().join("part1.ltm");
            let second = dir.path().join("part2.ltm");

            write_container(
                &first,
                &[
                    (ANNOTATIONS_MEMBER, b"part one".to_vec()),
                    (CONFIG_MEMBER, config(4, 0, 1, 33_333_333, 10, 5, 31).into_bytes()),
                    (INPUTS_MEMBER, inputs("K", 31)),
                ],
            )
            .unwrap();
            write_container(
                &second,
                &[
                    (ANNOTATIONS_MEMBER, b"part two".to_vec()),
                    (CONFIG_MEMBER, config(5, 5, 2, 0, 7, 3, 60).into_bytes()),
                    (INPUTS_MEMBER, inputs("A", 60)),
                ],
            )
            .unwrap();

            let output = dir.path().join("out").join("merged.ltm");
            Self {
                dir,
                first,
                second,
                output,
            }
        }

        fn settings(&self) -> Settings {
            let mut settings = Settings::default();
            let root = |name: &str| self.dir.path().join(name).to_string_lossy().into_owned();
            settings.paths.temp_root = root("temp");
            settings.paths.work_folder = root("work");
            settings.paths.logs_folder = root("logs");
            settings
        }

        fn request(&self) -> MergeRequest {
            MergeRequest::new(&self.first, &self.second, &self.output)
        }

        fn temp_root(&self) -> PathBuf {
            self.dir.path().join("temp")
        }

        fn read(&self, path: &Path) -> Vec<u8> {
            fs::read(path).unwrap()
        }
    }

    fn leftover_extractions(root: &Path) -> usize {
        fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
    }

    #[test]
    fn full_merge_commits_spliced_recording() {
        let fx = Fixture::new();
        let first_before = fx.read(&fx.first);
        let states = fx.dir.path().join("states.txt");
        fs::write(&states, "5052,5200000,2").unwrap();

        let runner = MergeRunner::new(fx.settings());
        let report = runner
            .run(fx.request().with_states_file(&states), MergeMode::Full, None, None)
            .unwrap();

        assert_eq!(report.phase, MergePhase::Committed);
        assert!(report.steps_skipped.is_empty());
        assert_eq!(report.alignment.unwrap().aligned, 1_067_804);
        assert_eq!(report.stitch.unwrap().delta_micros, 34_471);
        assert_eq!(report.reseed_added_micros, Some(128));

        let merged = Recording::load(&fx.output, fx.temp_root()).unwrap();
        let rendered = merged.frames.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 92);
        assert_eq!(
            &lines[29..35],
            &[
                "|K30|",
                "|K31|",
                "|K31|T1000000:34471|",
                "|A1|",
                "|A2|T30000000:1003840|",
                "|A3|",
            ]
        );
        assert_eq!(lines[91], "|A60|");
        assert_length_matches_log(&merged);

        let meta = &merged.metadata;
        assert_eq!(meta.version().unwrap(), Version::new(1, 4, 5));
        assert_eq!(meta.rerecord_count().unwrap(), 17);
        assert_eq!(meta.savestate_frame_count().unwrap(), 8);
        assert_eq!(meta.frame_count().unwrap(), Some(92));
        assert_eq!(meta.start_micros().unwrap(), 0);
        assert_eq!(meta.length_nanos().unwrap(), 3_067_932_333);
        let rate = merged.frame_rate().unwrap();
        assert_eq!(rate.rate, Rate::integer(30));
        assert!(rate.variable);
        assert_eq!(merged.annotations.as_deref(), Some("part two"));

        // The splice lands on the second recording's startup state.
        assert_eq!(micros_to_state(1_067_804), micros_to_state(5_000_000));

        assert_eq!(fx.read(&fx.first), first_before);
        assert_eq!(leftover_extractions(&fx.temp_root()), 0);
        assert!(report.log_path.exists());
    }

    #[test]
    fn prepare_then_resume_with_persisted_alignment() {
        let fx = Fixture::new();
        let runner = MergeRunner::new(fx.settings());

        let prepared = runner
            .run(fx.request(), MergeMode::Prepare, None, None)
            .unwrap();
        assert_eq!(prepared.phase, MergePhase::Align);
        assert!(!fx.output.exists());

        let artifact = prepared.alignment_artifact.unwrap();
        assert!(artifact.ends_with(Path::new("part1+part2").join(ALIGNMENT_ARTIFACT)));
        let alignment = Alignment::load(&artifact).unwrap();
        assert_eq!(alignment.aligned, 1_067_804);

        let points = vec![ReseedPoint {
            state: micros_to_state(5_200_000),
            micros: 1_267_804,
            entry_index: 2,
        }];
        let report = runner
            .run(
                fx.request().with_alignment(alignment).with_reseed_points(points),
                MergeMode::Full,
                None,
                None,
            )
            .unwrap();

        assert_eq!(report.phase, MergePhase::Committed);
        assert_eq!(report.alignment_artifact, None);
        assert_eq!(report.reseed_added_micros, Some(128));
        assert!(fx.output.is_file());
    }

    #[test]
    fn reseed_is_skipped_without_points() {
        let fx = Fixture::new();
        let report = MergeRunner::new(fx.settings())
            .run(fx.request(), MergeMode::Full, None, None)
            .unwrap();

        assert_eq!(report.steps_skipped, vec!["Reseed".to_string()]);
        assert_eq!(report.reseed_added_micros, None);
        assert_eq!(report.summary.unwrap().length_micros, 3_067_804);

        let merged = Recording::load(&fx.output, fx.temp_root()).unwrap();
        assert_length_matches_log(&merged);
    }

    #[test]
    fn config_with_retired_length_switch_still_merges() {
        let fx = Fixture::new();
        let mut settings: Settings =
            toml::from_str("[merge]\nmaintain_length = false\npersist_alignment = false\n")
                .unwrap();
        settings.paths = fx.settings().paths;

        let report = MergeRunner::new(settings)
            .run(fx.request(), MergeMode::Full, None, None)
            .unwrap();

        assert_eq!(report.phase, MergePhase::Committed);
        assert_eq!(report.alignment_artifact, None);
        let merged = Recording::load(&fx.output, fx.temp_root()).unwrap();
        assert_eq!(merged.end_micros().unwrap(), 3_067_804);
        assert_length_matches_log(&merged);
    }

    #[test]
    fn failed_alignment_aborts_without_output() {
        let fx = Fixture::new();
        let mut settings = fx.settings();
        settings.search.window = 1_000;

        let err = MergeRunner::new(settings)
            .run(fx.request(), MergeMode::Full, None, None)
            .unwrap_err();

        match err {
            PipelineError::StepFailed {
                step_name, source, ..
            } => {
                assert_eq!(step_name, "Align");
                assert!(matches!(source, StepError::SpliceAlignmentFailed(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!fx.output.exists());
        assert_eq!(leftover_extractions(&fx.temp_root()), 0);
    }

    #[test]
    fn output_spelled_as_an_input_is_rejected() {
        let fx = Fixture::new();
        fs::create_dir(fx.dir.path().join("sub")).unwrap();
        let output = fx.dir.path().join("sub").join("..").join("part1.ltm");
        let first_before = fx.read(&fx.first);

        let err = MergeRunner::new(fx.settings())
            .run(
                MergeRequest::new(&fx.first, &fx.second, &output),
                MergeMode::Full,
                None,
                None,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::StepFailed {
                source: StepError::InvalidInput(_),
                ..
            }
        ));
        assert_eq!(fx.read(&fx.first), first_before);
    }

    #[test]
    fn tampered_alignment_is_rejected() {
        let fx = Fixture::new();
        let alignment = Alignment {
            second_start: 5_000_000,
            first_end: 1_033_333,
            aligned: 1_067_805,
        };

        let err = MergeRunner::new(fx.settings())
            .run(fx.request().with_alignment(alignment), MergeMode::Full, None, None)
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::StepFailed {
                source: StepError::Timeline(_),
                ..
            }
        ));
        assert!(!fx.output.exists());
    }

    #[test]
    fn standard_pipeline_order() {
        assert_eq!(
            create_merge_pipeline().step_names(),
            vec!["Align", "Stitch end", "Reconcile", "Reseed", "Splice"]
        );
        assert_eq!(create_prepare_pipeline().step_count(), 1);
    }
}
