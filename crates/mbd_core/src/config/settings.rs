//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a default so a partial file still parses.

use serde::{Deserialize, Serialize};

use crate::backend::DecoderKind;
use crate::discovery::DiscoveryMode;
use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Unit discovery settings.
    #[serde(default)]
    pub discovery: DiscoverySettings,

    /// Movie reader settings.
    #[serde(default)]
    pub reader: ReaderSettings,

    /// External pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            discovery: DiscoverySettings::default(),
            reader: ReaderSettings::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Path configuration for input, output, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory scanned for movies (flat and nested discovery).
    #[serde(default = "default_input_folder")]
    pub input_folder: String,

    /// Movie processed in single discovery mode.
    #[serde(default)]
    pub input_file: String,

    /// Root folder for per-movie results.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files and run reports.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_input_folder() -> String {
    "to_process".to_string()
}

fn default_output_folder() -> String {
    "processed".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_folder: default_input_folder(),
            input_file: String::new(),
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Unit discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// How movies are located under the input folder.
    #[serde(default)]
    pub mode: DiscoveryMode,

    /// Wildcard pattern movie file names must match (`*` and `?`).
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    /// Suffix marker that ends the derived output name.
    #[serde(default = "default_name_marker")]
    pub name_marker: String,
}

fn default_file_pattern() -> String {
    "*.tif*".to_string()
}

fn default_name_marker() -> String {
    ".tif".to_string()
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::default(),
            file_pattern: default_file_pattern(),
            name_marker: default_name_marker(),
        }
    }
}

/// Decoding parameters the worker uses to open movies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// Decoder backend the worker should use.
    #[serde(default)]
    pub decoder: DecoderKind,

    /// Filename prototype for the pattern decoder.
    #[serde(default = "default_prototype")]
    pub prototype: String,

    /// Axis order of the prototype fields (position/channel/timepoint).
    #[serde(default = "default_file_order")]
    pub file_order: String,

    /// First index used by the prototype numbering.
    #[serde(default)]
    pub index_base: u32,
}

fn default_prototype() -> String {
    "pos%01i_ch%01i_frm%04i.tif".to_string()
}

fn default_file_order() -> String {
    "pct".to_string()
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            decoder: DecoderKind::default(),
            prototype: default_prototype(),
            file_order: default_file_order(),
            index_base: 0,
        }
    }
}

/// External pipeline invocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Path to the pipeline's own configuration file.
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Save-format override applied once after configuration load.
    #[serde(default)]
    pub save_format: Option<Vec<String>>,

    /// Analysis worker executable.
    #[serde(default = "default_worker")]
    pub worker: String,

    /// Extra arguments passed to the worker before the subcommand.
    #[serde(default)]
    pub worker_args: Vec<String>,
}

fn default_config_file() -> String {
    "pipeline_config.json".to_string()
}

fn default_worker() -> String {
    "analysis-worker".to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            save_format: None,
            worker: default_worker(),
            worker_args: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console output.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a log file into the logs folder.
    #[serde(default = "default_true")]
    pub log_to_file: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            log_to_file: true,
        }
    }
}
