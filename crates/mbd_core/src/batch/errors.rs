//! Error types for batch runs.
//!
//! Errors come in two tiers: `BatchError` aborts the whole run,
//! `UnitError` is recorded against one unit and the batch moves on.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::discovery::DiscoveryError;

/// Fatal error that aborts the whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Driver settings could not be loaded.
    #[error("Failed to load settings: {0}")]
    Settings(#[from] ConfigError),

    /// The pipeline configuration could not be loaded.
    #[error("Failed to load pipeline configuration: {0}")]
    PipelineConfig(#[source] BackendError),

    /// A required directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Scanning the input tree failed.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

impl BatchError {
    /// Create a directory creation error.
    pub fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Stage of unit processing where a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStage {
    /// Output directory already claimed by an earlier unit.
    Collision,
    /// Reader construction over the input movie.
    ReaderInit,
    /// Experiment shape query.
    Probe,
    /// Pipeline construction.
    PipelineInit,
    /// Pipeline execution.
    PipelineRun,
}

impl UnitStage {
    /// All stages in processing order.
    pub const ALL: [UnitStage; 5] = [
        UnitStage::Collision,
        UnitStage::ReaderInit,
        UnitStage::Probe,
        UnitStage::PipelineInit,
        UnitStage::PipelineRun,
    ];

    /// Stable name used in reports and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStage::Collision => "collision",
            UnitStage::ReaderInit => "reader-init",
            UnitStage::Probe => "probe",
            UnitStage::PipelineInit => "pipeline-init",
            UnitStage::PipelineRun => "pipeline-run",
        }
    }
}

impl fmt::Display for UnitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-unit failure, recorded without aborting the batch.
#[derive(Error, Debug)]
#[error("Unit '{label}' failed at {stage}: {source}")]
pub struct UnitError {
    /// Unit label (`subfolder/name` for nested units).
    pub label: String,
    /// Stage where processing failed.
    pub stage: UnitStage,
    /// Underlying backend error.
    #[source]
    pub source: BackendError,
}

impl UnitError {
    /// Create a unit error.
    pub fn new(label: impl Into<String>, stage: UnitStage, source: BackendError) -> Self {
        Self {
            label: label.into(),
            stage,
            source,
        }
    }
}
