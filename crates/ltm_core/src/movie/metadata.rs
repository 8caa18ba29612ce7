//! The movie's `config.ini` member.
//!
//! # Format Overview
//!
//! A small INI document. Recorder settings live under `[General]` as
//! `key=value` pairs written without spaces around `=`:
//!
//! ```text
//! [General]
//! framerate_num=60
//! framerate_den=1
//! initial_monotonic_time_sec=1
//! initial_monotonic_time_nsec=33333000
//! length_sec=12
//! length_nsec=500000000
//! ```
//!
//! Section and key order, and every key this crate does not know about,
//! survive a parse/render cycle so a rewrite only touches what it sets.

use crate::frames::{Rate, MICROS_PER_SECOND};

use super::error::{MetadataError, MetadataResult};
use super::version::Version;

/// Section holding every key the merge reads.
pub const GENERAL: &str = "General";

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MICRO: u64 = 1_000;

pub mod keys {
    pub const MAJOR_VERSION: &str = "libtas_major_version";
    pub const MINOR_VERSION: &str = "libtas_minor_version";
    pub const PATCH_VERSION: &str = "libtas_patch_version";
    pub const FRAMERATE_NUM: &str = "framerate_num";
    pub const FRAMERATE_DEN: &str = "framerate_den";
    pub const VARIABLE_FRAMERATE: &str = "variable_framerate";
    pub const START_SEC: &str = "initial_monotonic_time_sec";
    pub const START_NSEC: &str = "initial_monotonic_time_nsec";
    pub const LEGACY_START_SEC: &str = "initial_time_sec";
    pub const LEGACY_START_NSEC: &str = "initial_time_nsec";
    pub const LENGTH_SEC: &str = "length_sec";
    pub const LENGTH_NSEC: &str = "length_nsec";
    pub const RERECORD_COUNT: &str = "rerecord_count";
    pub const SAVESTATE_FRAME_COUNT: &str = "savestate_frame_count";
    pub const FRAME_COUNT: &str = "frame_count";
}

/// Default rate of a movie plus whether per-frame overrides are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub rate: Rate,
    pub variable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// Order-preserving key-value metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    sections: Vec<Section>,
}

impl Metadata {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI content.
    ///
    /// Blank lines and `#`/`;` comments are dropped. Keys are
    /// case-sensitive; a repeated key keeps its first position and last
    /// value.
    pub fn parse(content: &str) -> MetadataResult<Self> {
        let mut doc = Self::new();

        for (line_num, line) in content.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.trim();

            if line.is_empty() || line == "\u{feff}" {
                continue;
            }
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim().to_string();
                if doc.section_index(&name).is_none() {
                    doc.sections.push(Section {
                        name,
                        entries: Vec::new(),
                    });
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(MetadataError::parse(
                    line_num,
                    format!("expected key=value, got '{}'", line),
                ));
            };

            let Some(section) = doc.sections.last_mut() else {
                return Err(MetadataError::parse(line_num, "key outside of any section"));
            };
            let section_name = section.name.clone();
            doc.set_in(&section_name, key.trim(), value.trim());
        }

        Ok(doc)
    }

    /// Render back to INI, one blank line after each section.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for section in &self.sections {
            output.push('[');
            output.push_str(&section.name);
            output.push_str("]\n");
            for (key, value) in &section.entries {
                output.push_str(key);
                output.push('=');
                output.push_str(value);
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }

    fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Raw value of `key` in `section`.
    pub fn get_in(&self, section: &str, key: &str) -> Option<&str> {
        let section = &self.sections[self.section_index(section)?];
        section
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` in `section`, creating either as needed.
    pub fn set_in(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        let index = match self.section_index(section) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };

        let entries = &mut self.sections[index].entries;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_string(), value)),
        }
    }

    /// Raw `[General]` value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_in(GENERAL, key)
    }

    /// Set a `[General]` value.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.set_in(GENERAL, key, value.to_string());
    }

    /// Whether `[General]` has `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Required unsigned `[General]` value.
    pub fn get_u64(&self, key: &str) -> MetadataResult<u64> {
        let raw = self.get(key).ok_or_else(|| MetadataError::missing(key))?;
        raw.parse().map_err(|_| MetadataError::invalid(key, raw))
    }

    /// Optional unsigned `[General]` value.
    pub fn get_opt_u64(&self, key: &str) -> MetadataResult<Option<u64>> {
        match self.get(key) {
            Some(_) => self.get_u64(key).map(Some),
            None => Ok(None),
        }
    }

    /// Boolean `[General]` value, `default` when absent.
    pub fn get_bool(&self, key: &str, default: bool) -> MetadataResult<bool> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(MetadataError::invalid(key, raw)),
        }
    }

    /// Recorder version.
    pub fn version(&self) -> MetadataResult<Version> {
        let part = |key: &str| -> MetadataResult<u32> {
            let value = self.get_u64(key)?;
            u32::try_from(value).map_err(|_| MetadataError::invalid(key, value.to_string()))
        };
        Ok(Version::new(
            part(keys::MAJOR_VERSION)?,
            part(keys::MINOR_VERSION)?,
            part(keys::PATCH_VERSION)?,
        ))
    }

    /// Overwrite the recorder version.
    pub fn set_version(&mut self, version: Version) {
        self.set(keys::MAJOR_VERSION, version.major);
        self.set(keys::MINOR_VERSION, version.minor);
        self.set(keys::PATCH_VERSION, version.patch);
    }

    /// Default rate and variable-rate flag.
    pub fn frame_rate(&self) -> MetadataResult<FrameRate> {
        let num = self.get_u64(keys::FRAMERATE_NUM)?;
        let den = self.get_u64(keys::FRAMERATE_DEN)?;
        let rate = Rate::new(num, den)
            .map_err(|_| MetadataError::invalid(keys::FRAMERATE_NUM, format!("{}:{}", num, den)))?;
        let variable = self.get_bool(keys::VARIABLE_FRAMERATE, false)?;
        Ok(FrameRate { rate, variable })
    }

    /// Overwrite the default rate and variable-rate flag.
    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) {
        self.set(keys::FRAMERATE_NUM, frame_rate.rate.num);
        self.set(keys::FRAMERATE_DEN, frame_rate.rate.den);
        self.set_variable_framerate(frame_rate.variable);
    }

    pub fn set_variable_framerate(&mut self, variable: bool) {
        self.set(keys::VARIABLE_FRAMERATE, variable);
    }

    /// Keys holding the start time, legacy pair when the monotonic one is
    /// absent.
    fn start_keys(&self) -> MetadataResult<(&'static str, &'static str)> {
        if self.contains(keys::START_SEC) {
            Ok((keys::START_SEC, keys::START_NSEC))
        } else if self.contains(keys::LEGACY_START_SEC) {
            tracing::debug!(
                "No {} in metadata, using legacy {}",
                keys::START_SEC,
                keys::LEGACY_START_SEC
            );
            Ok((keys::LEGACY_START_SEC, keys::LEGACY_START_NSEC))
        } else {
            Err(MetadataError::MissingLegacyField {
                primary: keys::START_SEC.to_string(),
                legacy: keys::LEGACY_START_SEC.to_string(),
            })
        }
    }

    /// Start time in nanoseconds.
    ///
    /// Movies from recorders without a monotonic clock store the start under
    /// `initial_time_*`; that pair is used when the monotonic pair is absent.
    pub fn start_nanos(&self) -> MetadataResult<u64> {
        let (sec_key, nsec_key) = self.start_keys()?;
        Ok(self.get_u64(sec_key)? * NANOS_PER_SECOND + self.get_u64(nsec_key)?)
    }

    /// Start time in microseconds.
    pub fn start_micros(&self) -> MetadataResult<u64> {
        Ok(self.start_nanos()? / NANOS_PER_MICRO)
    }

    /// Overwrite the start time under whichever key pair this document uses
    /// (the monotonic pair when it has neither).
    pub fn set_start_nanos(&mut self, nanos: u64) {
        let (sec_key, nsec_key) = self
            .start_keys()
            .unwrap_or((keys::START_SEC, keys::START_NSEC));
        self.set(sec_key, nanos / NANOS_PER_SECOND);
        self.set(nsec_key, nanos % NANOS_PER_SECOND);
    }

    /// Declared length in nanoseconds.
    pub fn length_nanos(&self) -> MetadataResult<u64> {
        let sec = self.get_u64(keys::LENGTH_SEC)?;
        let nsec = self.get_u64(keys::LENGTH_NSEC)?;
        Ok(sec * NANOS_PER_SECOND + nsec)
    }

    /// Declared length in microseconds (`sec` and `nsec` truncated apart).
    pub fn length_micros(&self) -> MetadataResult<u64> {
        let sec = self.get_u64(keys::LENGTH_SEC)?;
        let nsec = self.get_u64(keys::LENGTH_NSEC)?;
        Ok(sec * MICROS_PER_SECOND + nsec / NANOS_PER_MICRO)
    }

    pub fn set_length_nanos(&mut self, nanos: u64) {
        self.set(keys::LENGTH_SEC, nanos / NANOS_PER_SECOND);
        self.set(keys::LENGTH_NSEC, nanos % NANOS_PER_SECOND);
    }

    /// Grow the declared length by `micros`.
    pub fn add_length_micros(&mut self, micros: u64) -> MetadataResult<()> {
        let nanos = self.length_nanos()?;
        self.set_length_nanos(nanos + micros * NANOS_PER_MICRO);
        Ok(())
    }

    /// Clock value at the end of the movie.
    pub fn end_micros(&self) -> MetadataResult<u64> {
        Ok(self.start_micros()? + self.length_micros()?)
    }

    pub fn rerecord_count(&self) -> MetadataResult<u64> {
        self.get_u64(keys::RERECORD_COUNT)
    }

    pub fn set_rerecord_count(&mut self, count: u64) {
        self.set(keys::RERECORD_COUNT, count);
    }

    pub fn savestate_frame_count(&self) -> MetadataResult<u64> {
        self.get_u64(keys::SAVESTATE_FRAME_COUNT)
    }

    pub fn set_savestate_frame_count(&mut self, count: u64) {
        self.set(keys::SAVESTATE_FRAME_COUNT, count);
    }

    /// Recorded frame count, when the recorder writes one.
    pub fn frame_count(&self) -> MetadataResult<Option<u64>> {
        self.get_opt_u64(keys::FRAME_COUNT)
    }

    pub fn set_frame_count(&mut self, count: u64) {
        self.set(keys::FRAME_COUNT, count);
    }
}
