//! Batch runner that drives every discovered unit through the pipeline.
//!
//! The runner owns the control flow of a batch: provision the output
//! root, load the pipeline configuration once, discover units, then
//! process them strictly one at a time in discovery order. A unit
//! failure is recorded and the batch moves on; only setup problems
//! (settings, directories, discovery, configuration load) abort the run.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::backend::{AnalysisBackend, BackendError, PipelineConfig};
use crate::config::BatchSettings;
use crate::discovery::{discover_units, BatchUnit};

use super::errors::{BatchError, BatchResult, UnitError, UnitStage};
use super::report::BatchReport;

/// Runs a full batch according to the settings.
///
/// # Example
///
/// ```ignore
/// let runner = BatchRunner::new(settings, ProcessBackend::from_settings(&settings));
/// let report = runner.run()?;
/// ```
pub struct BatchRunner<B: AnalysisBackend> {
    /// Driver settings for this run.
    settings: BatchSettings,
    /// External analysis backend.
    backend: B,
}

impl<B: AnalysisBackend> BatchRunner<B> {
    /// Create a new batch runner.
    pub fn new(settings: BatchSettings, backend: B) -> Self {
        Self { settings, backend }
    }

    /// Run the whole batch and return its report.
    ///
    /// Every discovered unit is attempted exactly once; a failing unit
    /// never prevents the ones after it from running.
    pub fn run(&self) -> BatchResult<BatchReport> {
        let output_root = PathBuf::from(&self.settings.paths.output_folder);
        fs::create_dir_all(&output_root).map_err(|e| BatchError::create_dir(&output_root, e))?;

        let config = self.load_config()?;

        let units = discover_units(&self.settings)?;
        tracing::info!("Discovered {} units", units.len());

        let mut report = BatchReport::new();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for (i, unit) in units.iter().enumerate() {
            tracing::info!("Processing unit {}/{}: {}", i + 1, units.len(), unit.label());

            // Output directories are unit-exclusive; a later unit deriving
            // the same name fails instead of sharing the first one's output.
            if !claimed.insert(unit.output_dir.clone()) {
                let error = UnitError::new(
                    unit.label(),
                    UnitStage::Collision,
                    BackendError::invalid_input(format!(
                        "output directory already claimed: {}",
                        unit.output_dir.display()
                    )),
                );
                tracing::error!("{}, skipping to next unit", error);
                report.record_failure(unit, &error);
                continue;
            }

            fs::create_dir_all(&unit.output_dir)
                .map_err(|e| BatchError::create_dir(&unit.output_dir, e))?;

            match self.process_unit(unit, &config) {
                Ok(()) => {
                    tracing::info!("Unit '{}' completed", unit.label());
                    report.record_success(unit);
                }
                Err(error) => {
                    tracing::error!("{}, skipping to next unit", error);
                    report.record_failure(unit, &error);
                }
            }
        }

        Ok(report.finish())
    }

    /// Load the pipeline configuration and apply the one-time override.
    fn load_config(&self) -> BatchResult<PipelineConfig> {
        let config_path = PathBuf::from(&self.settings.pipeline.config_file);
        let config = self
            .backend
            .load_pipeline_config(&config_path)
            .map_err(BatchError::PipelineConfig)?;

        match &self.settings.pipeline.save_format {
            Some(formats) => Ok(config.with_save_format(formats.clone())),
            None => Ok(config),
        }
    }

    /// Process one unit: open the reader, log the shape, run the pipeline.
    ///
    /// The reader and pipeline live only for this attempt and are dropped
    /// when it ends, whichever way it ends.
    fn process_unit(&self, unit: &BatchUnit, config: &PipelineConfig) -> Result<(), UnitError> {
        let reader = self
            .backend
            .open_reader(&unit.input_path)
            .map_err(|e| UnitError::new(unit.label(), UnitStage::ReaderInit, e))?;

        let shape = reader
            .shape()
            .map_err(|e| UnitError::new(unit.label(), UnitStage::Probe, e))?;
        tracing::info!(
            "Unit '{}': {} positions, {} channels, {} timepoints",
            unit.label(),
            shape.positions,
            shape.channels,
            shape.timepoints
        );

        let mut pipeline = self
            .backend
            .create_pipeline(reader, config, &unit.output_dir)
            .map_err(|e| UnitError::new(unit.label(), UnitStage::PipelineInit, e))?;

        pipeline
            .run()
            .map_err(|e| UnitError::new(unit.label(), UnitStage::PipelineRun, e))
    }
}
