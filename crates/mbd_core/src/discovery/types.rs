//! Batch unit types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Strategy for locating movies under the input folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Movie files sit directly in the input folder.
    #[default]
    Flat,
    /// The input folder holds subfolders, each holding movie files.
    Nested,
    /// Exactly one configured movie file, no scan.
    Single,
}

/// One independently processable input movie.
///
/// Created at discovery time and consumed by one runner iteration.
/// Paths are computed here; directory creation belongs to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUnit {
    /// Path to the movie file.
    pub input_path: PathBuf,
    /// Source subfolder name (nested discovery only).
    pub subfolder: Option<String>,
    /// Identifier derived from the file name.
    pub short_name: String,
    /// Directory the pipeline writes results into.
    pub output_dir: PathBuf,
    /// Whether the name marker was found when deriving the short name.
    pub marker_found: bool,
}

impl BatchUnit {
    /// Label used in logs and reports (`subfolder/short_name` when nested).
    pub fn label(&self) -> String {
        match &self.subfolder {
            Some(sub) => format!("{}/{}", sub, self.short_name),
            None => self.short_name.clone(),
        }
    }
}
