//! Movie Batch Driver binary entry point.
//!
//! Usage:
//!   movie-batch [settings.toml]
//!
//! The settings file defaults to `movie-batch.toml` in the working
//! directory and is created with defaults on first run. The process
//! exits 0 after any completed batch, even when units failed; only
//! setup errors (settings, discovery, pipeline configuration) exit
//! non-zero.

use std::env;

use anyhow::{Context, Result};

use mbd_core::backend::ProcessBackend;
use mbd_core::batch::BatchRunner;
use mbd_core::config::ConfigManager;
use mbd_core::logging::init_tracing;

fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "movie-batch.toml".to_string());

    let mut manager = ConfigManager::new(&config_path);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load settings from '{}'", config_path))?;
    manager
        .ensure_dirs_exist()
        .context("Failed to create output and logs directories")?;

    let settings = manager.settings().clone();
    let logs_dir = manager.logs_folder();

    let log_dir = settings.logging.log_to_file.then(|| logs_dir.clone());
    // Keep the guard alive so the file writer flushes on exit
    let _guard = init_tracing(settings.logging.level, log_dir.as_deref());

    tracing::info!("Movie Batch Driver v{}", mbd_core::version());
    tracing::info!("Settings: {}", manager.path().display());

    let backend = ProcessBackend::from_settings(&settings);
    let report = BatchRunner::new(settings, backend)
        .run()
        .context("Batch aborted")?;

    tracing::info!(
        "Batch finished: {} attempted, {} succeeded, {} failed",
        report.attempted,
        report.succeeded,
        report.failed
    );
    for (stage, count) in report.failures_by_stage() {
        if count > 0 {
            tracing::warn!("  {} failed at {}", count, stage);
        }
    }

    let report_path = logs_dir.join("report.json");
    report
        .save(&report_path)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    tracing::info!("Report written to {}", report_path.display());

    Ok(())
}
