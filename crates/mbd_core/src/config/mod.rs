//! Configuration management for the batch driver.
//!
//! This module provides:
//! - TOML-based settings with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Defaults for every field so partial files parse
//!
//! # Example
//!
//! ```no_run
//! use mbd_core::config::ConfigManager;
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new("movie-batch.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Input folder: {}", config.settings().paths.input_folder);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    BatchSettings, DiscoverySettings, LoggingSettings, PathSettings, PipelineSettings,
    ReaderSettings,
};
