//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::rng::{DEFAULT_ALIGNED_STRIDE, DEFAULT_ALIGNED_WINDOW, DEFAULT_SEARCH_WINDOW};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Search windows and strides.
    #[serde(default)]
    pub search: SearchSettings,

    /// Merge behavior.
    #[serde(default)]
    pub merge: MergeSettings,
}

/// Path configuration for extraction, artifacts, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for extracted containers.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for merge artifacts (`<merge>/alignment.json`).
    #[serde(default = "default_work_folder")]
    pub work_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_work_folder() -> String {
    ".work".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            work_folder: default_work_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for merge logs and the default tracing filter.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep per-entry detail out of the console.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of detail lines to show after an abort.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with the time of day.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Logger configuration for one merge.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Search limits, all in microseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Window for the unit-stride searches (alignment, reseeds, states).
    #[serde(default = "default_window")]
    pub window: u64,

    /// Window for `match-state --stride`.
    #[serde(default = "default_aligned_window")]
    pub aligned_window: u64,

    /// Default stride for `match-state --stride`.
    #[serde(default = "default_aligned_stride")]
    pub aligned_stride: u64,

    /// Window for the `repeats` and `duplicates` scans.
    #[serde(default = "default_analysis_window")]
    pub analysis_window: u64,
}

fn default_window() -> u64 {
    DEFAULT_SEARCH_WINDOW
}

fn default_aligned_window() -> u64 {
    DEFAULT_ALIGNED_WINDOW
}

fn default_aligned_stride() -> u64 {
    DEFAULT_ALIGNED_STRIDE
}

fn default_analysis_window() -> u64 {
    1_000_000
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            window: default_window(),
            aligned_window: default_aligned_window(),
            aligned_stride: default_aligned_stride(),
            analysis_window: default_analysis_window(),
        }
    }
}

/// Merge behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Write `alignment.json` to the work folder after aligning.
    #[serde(default = "default_true")]
    pub persist_alignment: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            persist_alignment: true,
        }
    }
}

/// Config sections for section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Search,
    Merge,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Search => "search",
            ConfigSection::Merge => "merge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("level = \"info\""));
        assert!(toml.contains("\nwindow = 10000000\n"));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.paths.temp_root, settings.paths.temp_root);
        assert_eq!(parsed.search.aligned_stride, 1_000);
        assert!(parsed.merge.persist_alignment);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[search]\nwindow = 500\n\n[logging]\nlevel = \"debug\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.search.window, 500);
        assert_eq!(parsed.search.aligned_window, 100_000_000);
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert!(parsed.logging.compact);
        assert_eq!(parsed.paths.logs_folder, ".logs");
    }
}
