//! Configuration management for avmaster.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Defaults for every key, so partial files are valid
//!
//! # Example
//!
//! ```no_run
//! use avmaster_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new(ConfigManager::default_path());
//! config.load_or_default().unwrap();
//!
//! println!("Assets: {}", config.settings().paths.assets_dir);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    BatchSettings, ConfigSection, FormatSettings, LoggingSettings, MasteringSettings,
    PathSettings, Settings,
};
