//! Directory scanning that turns an input tree into batch units.
//!
//! Flat mode lists the input folder itself, nested mode lists one level
//! of subfolders, single mode takes the configured file path as-is.
//! File listings are sorted by name so batch order is reproducible;
//! subfolder order follows the directory entry order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BatchSettings;

use super::naming::derive_short_name;
use super::types::{BatchUnit, DiscoveryMode};

/// Errors raised while scanning the input tree.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Reading a directory failed.
    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Single mode was selected without an input file.
    #[error("Single discovery mode requires paths.input_file to be set")]
    InputNotConfigured,
}

impl DiscoveryError {
    /// Create a scan error with path context.
    pub fn scan(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            source,
        }
    }
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Discover all batch units for the configured input tree.
///
/// Units come back in processing order: sorted by file name within a
/// folder, folders in directory entry order. An empty result is valid
/// and yields a no-op batch.
pub fn discover_units(settings: &BatchSettings) -> DiscoveryResult<Vec<BatchUnit>> {
    let input_dir = Path::new(&settings.paths.input_folder);
    let output_root = Path::new(&settings.paths.output_folder);
    let pattern = &settings.discovery.file_pattern;
    let marker = &settings.discovery.name_marker;

    match settings.discovery.mode {
        DiscoveryMode::Flat => {
            let files = list_matching(input_dir, pattern)?;
            Ok(files
                .into_iter()
                .map(|path| unit_for_file(path, None, output_root, marker))
                .collect())
        }
        DiscoveryMode::Nested => {
            let entries =
                fs::read_dir(input_dir).map_err(|e| DiscoveryError::scan(input_dir, e))?;
            let mut units = Vec::new();

            for entry in entries {
                let entry = entry.map_err(|e| DiscoveryError::scan(input_dir, e))?;
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let Some(subfolder) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let subfolder = subfolder.to_string();

                for file in list_matching(&path, pattern)? {
                    units.push(unit_for_file(
                        file,
                        Some(subfolder.clone()),
                        output_root,
                        marker,
                    ));
                }
            }

            Ok(units)
        }
        DiscoveryMode::Single => {
            if settings.paths.input_file.is_empty() {
                return Err(DiscoveryError::InputNotConfigured);
            }
            let path = PathBuf::from(&settings.paths.input_file);
            Ok(vec![unit_for_file(path, None, output_root, marker)])
        }
    }
}

/// List immediate files in `dir` whose names match `pattern`, sorted by name.
fn list_matching(dir: &Path, pattern: &str) -> DiscoveryResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| DiscoveryError::scan(dir, e))?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| DiscoveryError::scan(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if wildcard_match(pattern, name) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Build the batch unit for one movie file.
fn unit_for_file(
    input_path: PathBuf,
    subfolder: Option<String>,
    output_root: &Path,
    marker: &str,
) -> BatchUnit {
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (short_name, marker_found) = derive_short_name(&file_name, marker);
    if !marker_found {
        tracing::warn!(
            "Name marker '{}' not found in '{}', using the full file name",
            marker,
            file_name
        );
    }

    let output_dir = match &subfolder {
        Some(sub) => output_root.join(sub).join(&short_name),
        None => output_root.join(&short_name),
    };

    BatchUnit {
        input_path,
        subfolder,
        short_name,
        output_dir,
        marker_found,
    }
}

/// Match a file name against a wildcard pattern.
///
/// Supports `*` (any run of characters) and `?` (any single character).
/// Matching is case-sensitive and applies to file names only, never to
/// path separators.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();

    let mut pi = 0;
    let mut ni = 0;
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((star_pi, star_ni)) = star {
            // Backtrack: let the last star swallow one more character
            pi = star_pi + 1;
            ni = star_ni + 1;
            star = Some((star_pi, star_ni + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
