//! Batch run reports.
//!
//! One `UnitReport` per attempted unit plus aggregate counts, with
//! timestamps, serializable to JSON so run results can be consumed
//! without parsing log output.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::discovery::BatchUnit;

use super::errors::{UnitError, UnitStage};

/// Outcome of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Succeeded,
    Failed,
}

/// Record of one attempted unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    /// Unit label (`subfolder/name` for nested units).
    pub label: String,
    /// Input movie path.
    pub input_path: String,
    /// Output directory the unit was assigned.
    pub output_dir: String,
    /// Final status.
    pub status: UnitStatus,
    /// Stage where processing failed (failed units only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<UnitStage>,
    /// Failure message (failed units only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the name marker was found when deriving the short name.
    pub marker_found: bool,
}

impl UnitReport {
    /// Record a successful unit.
    pub fn succeeded(unit: &BatchUnit) -> Self {
        Self {
            label: unit.label(),
            input_path: unit.input_path.display().to_string(),
            output_dir: unit.output_dir.display().to_string(),
            status: UnitStatus::Succeeded,
            stage: None,
            error: None,
            marker_found: unit.marker_found,
        }
    }

    /// Record a failed unit.
    pub fn failed(unit: &BatchUnit, error: &UnitError) -> Self {
        Self {
            label: unit.label(),
            input_path: unit.input_path.display().to_string(),
            output_dir: unit.output_dir.display().to_string(),
            status: UnitStatus::Failed,
            stage: Some(error.stage),
            error: Some(error.to_string()),
            marker_found: unit.marker_found,
        }
    }
}

/// Summary of one batch run (saved to report.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Run start time (RFC 3339).
    pub started_at: String,
    /// Run end time (RFC 3339).
    pub finished_at: String,
    /// Units attempted.
    pub attempted: usize,
    /// Units that completed successfully.
    pub succeeded: usize,
    /// Units that failed.
    pub failed: usize,
    /// Per-unit records in processing order.
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    /// Start a new report stamped with the current time.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now().to_rfc3339(),
            finished_at: String::new(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            units: Vec::new(),
        }
    }

    /// Record a successful unit.
    pub fn record_success(&mut self, unit: &BatchUnit) {
        self.attempted += 1;
        self.succeeded += 1;
        self.units.push(UnitReport::succeeded(unit));
    }

    /// Record a failed unit.
    pub fn record_failure(&mut self, unit: &BatchUnit, error: &UnitError) {
        self.attempted += 1;
        self.failed += 1;
        self.units.push(UnitReport::failed(unit, error));
    }

    /// Stamp the end time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now().to_rfc3339();
        self
    }

    /// Failure counts per stage, in processing order.
    pub fn failures_by_stage(&self) -> Vec<(UnitStage, usize)> {
        UnitStage::ALL
            .iter()
            .map(|stage| {
                let count = self
                    .units
                    .iter()
                    .filter(|u| u.stage == Some(*stage))
                    .count();
                (*stage, count)
            })
            .collect()
    }

    /// Persist the report as pretty JSON, atomically.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        // Write atomically via temp file
        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, &json)?;
        fs::rename(&temp_file, path)?;

        tracing::debug!("Saved report for {} units to {}", self.units.len(), path.display());
        Ok(())
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
