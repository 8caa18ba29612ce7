//! Configuration management for ltm-merge.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Automatic defaults for missing keys
//!
//! # Example
//!
//! ```no_run
//! use ltm_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/ltm-merge.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Search window: {}", config.settings().search.window);
//!
//! config.settings_mut().merge.persist_alignment = false;
//! config.update_section(ConfigSection::Merge).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult, DEFAULT_CONFIG_PATH};
pub use settings::{
    ConfigSection, LoggingSettings, MergeSettings, PathSettings, SearchSettings, Settings,
};
