//! Logging infrastructure for the batch driver.
//!
//! This module provides:
//! - Global `tracing` subscriber setup with RUST_LOG override
//! - Optional non-blocking log file output into the logs folder
//! - The `LogLevel` type used by the settings file

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

/// Initialize the global tracing subscriber.
///
/// This sets up a subscriber that:
/// - Respects the RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to the console with timestamps
/// - Additionally writes to `movie-batch.log` in `log_dir` when given
///
/// Should be called once at application startup. The returned guard must
/// be held for the lifetime of the process so buffered file output is
/// flushed on shutdown.
pub fn init_tracing(default_level: LogLevel, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "movie-batch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(filter)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .with(filter)
                .init();

            None
        }
    }
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
