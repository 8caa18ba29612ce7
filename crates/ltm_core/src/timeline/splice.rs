//! Metadata reconciliation and frame log splicing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::frames::{FrameError, Rate};
use crate::movie::{keys, newer_of, FrameRate, Metadata, Newer, Recording, Version};

use super::error::TimelineResult;

/// Output metadata before the logs are joined.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Which input the output's metadata and side streams come from.
    pub base: Newer,
    pub version: Version,
    pub rerecord_count: u64,
    pub savestate_frame_count: u64,
    /// Newer input's metadata with summed counters.
    pub metadata: Metadata,
}

/// Summary of a finished splice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceSummary {
    pub version: String,
    pub rate: Rate,
    pub variable_framerate: bool,
    pub first_entries: usize,
    pub second_entries: usize,
    pub second_converted: bool,
    pub length_micros: u64,
    pub rerecord_count: u64,
    pub savestate_frame_count: u64,
}

/// Pick the newer input as the output base and sum the counters.
pub fn reconcile(first: &Recording, second: &Recording) -> TimelineResult<Reconciled> {
    let first_version = first.version()?;
    let second_version = second.version()?;
    let base = newer_of(&first_version, &second_version)?;

    let rerecord_count = first.metadata.rerecord_count()? + second.metadata.rerecord_count()?;
    let savestate_frame_count =
        first.metadata.savestate_frame_count()? + second.metadata.savestate_frame_count()?;

    let (version, mut metadata) = match base {
        Newer::First => (first_version, first.metadata.clone()),
        Newer::Second => (second_version, second.metadata.clone()),
    };
    metadata.set_rerecord_count(rerecord_count);
    metadata.set_savestate_frame_count(savestate_frame_count);

    tracing::debug!(
        "Output based on {:?} input (version {}), rerecords {}, savestate frames {}",
        base,
        version,
        rerecord_count,
        savestate_frame_count
    );

    Ok(Reconciled {
        base,
        version,
        rerecord_count,
        savestate_frame_count,
        metadata,
    })
}

/// Default rate of the merged output.
///
/// The first input's rate wins. The output stays constant-rate only when
/// both inputs are constant-rate at the same rate.
pub fn output_frame_rate(first: FrameRate, second: FrameRate) -> TimelineResult<FrameRate> {
    for input in [first.rate, second.rate] {
        if !input.is_integer() {
            return Err(FrameError::UnsupportedRateConfiguration {
                from: input,
                to: Rate::integer(first.rate.num),
            }
            .into());
        }
    }

    let constant = !first.variable && !second.variable && first.rate.num == second.rate.num;
    Ok(FrameRate {
        rate: Rate::integer(first.rate.num),
        variable: !constant,
    })
}

/// Join `first` and `second` into a new recording destined for `dest`.
///
/// The second log is converted to the output rate when the defaults
/// differ. Start time comes from the first input, the output length is the
/// sum of both lengths, and any `frame_count` key is set to the joined
/// entry count.
pub fn splice(
    first: &Recording,
    second: &Recording,
    reconciled: &Reconciled,
    dest: impl Into<PathBuf>,
) -> TimelineResult<(Recording, SpliceSummary)> {
    let first_rate = first.frame_rate()?;
    let second_rate = second.frame_rate()?;
    let out_rate = output_frame_rate(first_rate, second_rate)?;

    let second_converted = second_rate.rate != out_rate.rate;
    let second_frames = if second_converted {
        second.frames.convert_rate(second_rate.rate, out_rate.rate)?
    } else {
        second.frames.clone()
    };

    let mut frames = first.frames.clone();
    let first_entries = frames.len();
    let second_entries = second_frames.len();
    frames.extend(second_frames);

    let mut metadata = reconciled.metadata.clone();
    metadata.set_frame_rate(out_rate);
    metadata.set_start_nanos(first.metadata.start_nanos()?);

    metadata.set_length_nanos(first.metadata.length_nanos()? + second.metadata.length_nanos()?);
    if metadata.contains(keys::FRAME_COUNT) {
        metadata.set_frame_count(frames.len() as u64);
    }

    let source = match reconciled.base {
        Newer::First => first,
        Newer::Second => second,
    };

    let summary = SpliceSummary {
        version: reconciled.version.to_string(),
        rate: out_rate.rate,
        variable_framerate: out_rate.variable,
        first_entries,
        second_entries,
        second_converted,
        length_micros: metadata.length_micros()?,
        rerecord_count: reconciled.rerecord_count,
        savestate_frame_count: reconciled.savestate_frame_count,
    };

    let output = Recording {
        path: dest.into(),
        annotations: source.annotations.clone(),
        metadata,
        editor: source.editor.clone(),
        frames,
    };

    Ok((output, summary))
}
