//! Interfaces to the external analysis collaborators.
//!
//! Image decoding, segmentation, and tracking all live outside this
//! crate. These traits are the seams the batch runner drives: a factory
//! for readers and pipelines, a reader that reports the experiment
//! shape, and a pipeline with a single run-to-completion operation.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the external analysis backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// An external command failed.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Parsing error (e.g. worker output).
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Input validation failed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BackendError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with operation context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Decoder backend the worker uses to open a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// Generic container decoding via the worker's bioformats support.
    #[default]
    Bioformats,
    /// Filename-pattern decoding with an explicit prototype.
    Pattern,
}

/// Experiment dimensions reported by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentShape {
    /// Number of imaging positions.
    pub positions: u32,
    /// Number of channels.
    pub channels: u32,
    /// Number of timepoints.
    pub timepoints: u32,
}

/// Handle to the external pipeline's configuration.
///
/// The configuration file's schema is owned by the pipeline; this type
/// only records where it was loaded from and the one override the
/// driver may apply. Immutable once the batch starts, shared by every
/// pipeline construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    source: PathBuf,
    save_format: Option<Vec<String>>,
}

impl PipelineConfig {
    /// Create a configuration handle for the given file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            save_format: None,
        }
    }

    /// Apply the save-format override.
    pub fn with_save_format(mut self, formats: Vec<String>) -> Self {
        self.save_format = Some(formats);
        self
    }

    /// Path the configuration was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Save-format override, if any.
    pub fn save_format(&self) -> Option<&[String]> {
        self.save_format.as_deref()
    }
}

/// Reader over one movie.
pub trait ExperimentReader {
    /// Path of the movie this reader is bound to.
    fn input_path(&self) -> &Path;

    /// Query the experiment dimensions.
    fn shape(&self) -> BackendResult<ExperimentShape>;
}

/// A constructed analysis pipeline, ready to run.
pub trait AnalysisPipeline {
    /// Run the full analysis to completion.
    ///
    /// Success is communicated only by normal return; results land in
    /// the output directory the pipeline was constructed with.
    fn run(&mut self) -> BackendResult<()>;
}

/// Factory for pipeline configurations, readers, and pipelines.
pub trait AnalysisBackend {
    /// Load the pipeline configuration from a file. Called once per batch.
    fn load_pipeline_config(&self, path: &Path) -> BackendResult<PipelineConfig>;

    /// Open a reader over one movie.
    fn open_reader(&self, input: &Path) -> BackendResult<Box<dyn ExperimentReader>>;

    /// Build a pipeline over `reader` writing into `output_dir`.
    fn create_pipeline(
        &self,
        reader: Box<dyn ExperimentReader>,
        config: &PipelineConfig,
        output_dir: &Path,
    ) -> BackendResult<Box<dyn AnalysisPipeline>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_context() {
        let err = BackendError::command_failed("analysis-worker", 2, "bad movie");
        let msg = err.to_string();
        assert!(msg.contains("analysis-worker"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("bad movie"));
    }

    #[test]
    fn pipeline_config_override() {
        let config = PipelineConfig::new("/cfg/pipeline.json");
        assert!(config.save_format().is_none());

        let config = config.with_save_format(vec!["pickle".to_string(), "movie".to_string()]);
        assert_eq!(
            config.save_format(),
            Some(&["pickle".to_string(), "movie".to_string()][..])
        );
        assert_eq!(config.source(), Path::new("/cfg/pipeline.json"));
    }

    #[test]
    fn shape_parses_from_json() {
        let json = r#"{"positions": 4, "channels": 2, "timepoints": 120}"#;
        let shape: ExperimentShape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.positions, 4);
        assert_eq!(shape.channels, 2);
        assert_eq!(shape.timepoints, 120);
    }
}
