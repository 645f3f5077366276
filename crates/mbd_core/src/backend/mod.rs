//! External analysis backend.
//!
//! The driver never decodes images or runs segmentation itself; it talks
//! to an external analysis runtime through the traits defined here. The
//! one shipped implementation, `ProcessBackend`, drives the runtime's
//! command-line worker as a child process.

mod process;
mod types;

pub use process::ProcessBackend;
pub use types::{
    AnalysisBackend, AnalysisPipeline, BackendError, BackendResult, DecoderKind, ExperimentReader,
    ExperimentShape, PipelineConfig,
};
