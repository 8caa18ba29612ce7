//! End-of-recording resynchronization marker.

use serde::{Deserialize, Serialize};

use crate::frames::Rate;
use crate::movie::Recording;

use super::align::Alignment;
use super::error::{TimelineError, TimelineResult};

/// What the stitch did to the first recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchOutcome {
    /// Time added after the recording's natural end.
    pub delta_micros: u64,
    /// 1-based index of the appended marker entry, if one was needed.
    pub marker_index: Option<usize>,
    /// Rate given to the marker.
    pub marker_rate: Option<Rate>,
}

/// Extend `first` so its clock ends exactly on `alignment.aligned`.
///
/// The final entry is copied with an override lasting exactly the missing
/// `delta` microseconds and appended after the original. The recording is
/// switched to variable rate so the override is honored. The declared
/// length (and frame count, if present) grows with the marker.
pub fn stitch_end(
    first: &mut Recording,
    alignment: &Alignment,
) -> TimelineResult<StitchOutcome> {
    let end = first.end_micros()?;
    if end != alignment.first_end {
        return Err(TimelineError::mismatch(format!(
            "first recording ends at {}, alignment expects {}",
            end, alignment.first_end
        )));
    }

    first.metadata.set_variable_framerate(true);

    let delta = alignment.delta();
    if delta == 0 {
        tracing::debug!("First recording already ends on the aligned state");
        return Ok(StitchOutcome {
            delta_micros: 0,
            marker_index: None,
            marker_rate: None,
        });
    }

    let rate = Rate::from_micros(delta)?;
    let index = first
        .frames
        .rewrite_last_entry(|last| last.with_rate(Some(rate)))?;

    first.metadata.add_length_micros(delta)?;
    if let Some(count) = first.metadata.frame_count()? {
        first.metadata.set_frame_count(count + 1);
    }

    tracing::debug!(
        "Appended marker entry {} at rate {} ({}us)",
        index,
        rate,
        delta
    );

    Ok(StitchOutcome {
        delta_micros: delta,
        marker_index: Some(index),
        marker_rate: Some(rate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameLog;
    use crate::movie::Metadata;
    use std::path::PathBuf;

    fn recording(config: &str, inputs: &str) -> Recording {
        Recording {
            path: PathBuf::from("first.ltm"),
            annotations: None,
            metadata: Metadata::parse(config).unwrap(),
            editor: None,
            frames: FrameLog::parse(inputs),
        }
    }

    const CONFIG: &str = "[General]\n\
        framerate_num=50\n\
        framerate_den=1\n\
        initial_monotonic_time_sec=1\n\
        initial_monotonic_time_nsec=0\n\
        length_sec=0\n\
        length_nsec=40000000\n\
        frame_count=2\n";

    #[test]
    fn marker_lands_on_aligned_time() {
        let mut first = recording(CONFIG, "|K|\n|K5|\n");
        let alignment = Alignment {
            second_start: 0,
            first_end: 1_040_000,
            aligned: 1_074_471,
        };

        let outcome = stitch_end(&mut first, &alignment).unwrap();
        assert_eq!(outcome.delta_micros, 34_471);
        assert_eq!(outcome.marker_index, Some(3));
        assert_eq!(first.frames.render(), "|K|\n|K5|\n|K5|T1000000:34471|\n");

        // The log now accounts for exactly the aligned end.
        let rate = first.frame_rate().unwrap();
        assert!(rate.variable);
        assert_eq!(
            first.start_micros().unwrap() + first.frames.elapsed_micros(rate.rate),
            alignment.aligned
        );
        assert_eq!(first.end_micros().unwrap(), alignment.aligned);
        assert_eq!(first.metadata.frame_count().unwrap(), Some(3));
    }

    #[test]
    fn zero_delta_needs_no_marker() {
        let mut first = recording(CONFIG, "|K|\n|K5|\n");
        let alignment = Alignment {
            second_start: 0,
            first_end: 1_040_000,
            aligned: 1_040_000,
        };

        let outcome = stitch_end(&mut first, &alignment).unwrap();
        assert_eq!(outcome.marker_index, None);
        assert_eq!(first.frames.len(), 2);
        assert!(first.frame_rate().unwrap().variable);
    }

    #[test]
    fn rejects_alignment_for_other_end() {
        let mut first = recording(CONFIG, "|K|\n");
        let alignment = Alignment {
            second_start: 0,
            first_end: 999,
            aligned: 1_000,
        };
        assert!(matches!(
            stitch_end(&mut first, &alignment),
            Err(TimelineError::AlignmentMismatch(_))
        ));
    }
}
