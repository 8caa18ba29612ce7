//! Core types for the merge pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::{sanitize_filename, MergeLogger};
use crate::movie::{Newer, RecordingArena, RecordingHandle};
use crate::timeline::{
    Alignment, Reconciled, ReseedCorrection, ReseedPoint, SpliceSummary, StitchOutcome,
};

/// Name of the persisted alignment inside a merge's work directory.
pub const ALIGNMENT_ARTIFACT: &str = "alignment.json";

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// What to merge, plus measurements supplied from earlier runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Recording that plays first.
    pub first: PathBuf,
    /// Recording continued after the splice.
    pub second: PathBuf,
    /// Destination of the merged container.
    pub output: PathBuf,
    /// Alignment from a previous run, verified instead of searched.
    #[serde(default)]
    pub alignment: Option<Alignment>,
    /// Reseed points already on the merged timeline.
    #[serde(default)]
    pub reseed_points: Vec<ReseedPoint>,
    /// States file with replay-measured reseeds (frame numbers filled in),
    /// mapped onto the merged timeline after alignment.
    #[serde(default)]
    pub states_file: Option<PathBuf>,
}

impl MergeRequest {
    pub fn new(
        first: impl Into<PathBuf>,
        second: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_reseed_points(mut self, points: Vec<ReseedPoint>) -> Self {
        self.reseed_points = points;
        self
    }

    pub fn with_states_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.states_file = Some(path.into());
        self
    }

    /// `<first stem>+<second stem>`, safe as a file name.
    pub fn default_name(&self) -> String {
        let stem = |p: &Path| {
            p.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recording".to_string())
        };
        sanitize_filename(&format!("{}+{}", stem(&self.first), stem(&self.second)))
    }

    pub fn has_reseeds(&self) -> bool {
        !self.reseed_points.is_empty() || self.states_file.is_some()
    }

    /// Both inputs name the same file.
    pub fn inputs_coincide(&self) -> bool {
        same_file(&self.first, &self.second)
    }

    /// The output would overwrite one of the inputs.
    pub fn output_is_input(&self) -> bool {
        same_file(&self.output, &self.first) || same_file(&self.output, &self.second)
    }
}

/// Compare two paths by where they resolve, not by spelling.
fn same_file(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

/// Canonical form of `path`. A file that does not exist yet resolves
/// through its parent directory.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Read-only context passed to merge steps.
pub struct Context {
    pub request: MergeRequest,
    pub settings: Settings,
    /// Merge name/identifier.
    pub merge_name: String,
    /// Merge-specific artifact directory (under the work folder).
    pub work_dir: PathBuf,
    /// Per-merge logger.
    pub logger: Arc<MergeLogger>,
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    pub fn new(
        request: MergeRequest,
        settings: Settings,
        merge_name: impl Into<String>,
        work_dir: PathBuf,
        logger: Arc<MergeLogger>,
    ) -> Self {
        Self {
            request,
            settings,
            merge_name: merge_name.into(),
            work_dir,
            logger,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    pub fn alignment_path(&self) -> PathBuf {
        self.work_dir.join(ALIGNMENT_ARTIFACT)
    }
}

/// Where a merge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergePhase {
    #[default]
    Pending,
    Align,
    StitchEnd,
    Reconcile,
    Reseed,
    Splice,
    /// Output written.
    Committed,
    /// A phase failed; nothing was written.
    Aborted,
}

impl MergePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MergePhase::Committed | MergePhase::Aborted)
    }
}

/// Mutable merge state accumulated by the steps.
///
/// Each step's output is stored in its own section. The open recordings
/// live in the arena; dropping the state releases their extraction
/// directories.
#[derive(Serialize)]
pub struct MergeState {
    pub merge_id: String,
    pub started_at: Option<String>,
    pub phase: MergePhase,
    #[serde(skip)]
    pub arena: RecordingArena,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<RecordingHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<RecordingHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<AlignOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stitch: Option<StitchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileOutput>,
    #[serde(skip)]
    pub reconciled: Option<Reconciled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reseed: Option<ReseedOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splice: Option<SpliceOutput>,
}

impl MergeState {
    /// Create an empty state extracting recordings under `temp_root`.
    pub fn new(merge_id: impl Into<String>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            merge_id: merge_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            phase: MergePhase::Pending,
            arena: RecordingArena::new(temp_root),
            first: None,
            second: None,
            align: None,
            stitch: None,
            reconcile: None,
            reconciled: None,
            reseed: None,
            splice: None,
        }
    }

    pub fn alignment(&self) -> Option<&Alignment> {
        self.align.as_ref().map(|a| &a.alignment)
    }

    /// Both input handles, once the Align phase opened them.
    pub fn handles(&self) -> Option<(RecordingHandle, RecordingHandle)> {
        Some((self.first?, self.second?))
    }

    pub fn is_committed(&self) -> bool {
        self.splice.is_some()
    }

    /// Close the input recordings without writing them.
    pub fn release_inputs(&mut self) {
        for handle in [self.first.take(), self.second.take()].into_iter().flatten() {
            let _ = self.arena.discard(handle);
        }
    }
}

/// Output from the Align phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignOutput {
    pub alignment: Alignment,
    pub target_state: u16,
    /// The alignment came from the request rather than a search.
    pub reused: bool,
    /// Where the alignment was persisted, if it was.
    pub artifact: Option<PathBuf>,
}

/// Output from the Reconcile phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutput {
    pub base: Newer,
    pub version: String,
    pub rerecord_count: u64,
    pub savestate_frame_count: u64,
}

/// Output from the Reseed phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReseedOutput {
    pub corrections: Vec<ReseedCorrection>,
    pub total_added_micros: u64,
}

/// Output from the Splice phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceOutput {
    pub output_path: PathBuf,
    pub summary: SpliceSummary,
}

/// Result of executing a merge step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step had nothing to do.
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn request_names_merge_after_inputs() {
        let request = MergeRequest::new("runs/part1.ltm", "runs/part2.ltm", "out.ltm");
        assert_eq!(request.default_name(), "part1+part2");
        assert!(!request.has_reseeds());
        assert!(request.with_states_file("states.txt").has_reseeds());
    }

    #[test]
    fn output_matching_input_is_detected_through_spelling() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.ltm");
        std::fs::write(&first, b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let detour = dir.path().join("sub").join("..").join("a.ltm");
        let request = MergeRequest::new(&first, dir.path().join("b.ltm"), &detour);
        assert!(request.output_is_input());
        assert!(MergeRequest::new(&first, &detour, "out.ltm").inputs_coincide());

        let fresh = MergeRequest::new(
            &first,
            dir.path().join("b.ltm"),
            dir.path().join("sub").join("..").join("out.ltm"),
        );
        assert!(!fresh.output_is_input());
        assert!(!fresh.inputs_coincide());
    }

    #[test]
    fn merge_state_serializes() {
        let dir = tempdir().unwrap();
        let mut state = MergeState::new("merge-1", dir.path());
        state.align = Some(AlignOutput {
            alignment: Alignment {
                second_start: 5_000_000,
                first_end: 1_033_333,
                aligned: 1_067_804,
            },
            target_state: 17428,
            reused: false,
            artifact: None,
        });

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"merge_id\":\"merge-1\""));
        assert!(json.contains("\"phase\":\"Pending\""));
        assert!(json.contains("\"aligned\":1067804"));
        assert!(!json.contains("splice"));
        assert!(!state.is_committed());
    }

    #[test]
    fn terminal_phases() {
        assert!(MergePhase::Committed.is_terminal());
        assert!(MergePhase::Aborted.is_terminal());
        assert!(!MergePhase::Reseed.is_terminal());
    }
}
