//! MBD Core - Batch driving logic for Movie Batch Driver
//!
//! This crate contains all batch orchestration logic with zero CLI
//! dependencies. It discovers movie files on disk, provisions one output
//! directory per movie, and drives an external analysis worker over each
//! one, isolating per-movie failures so a batch always runs to completion.

pub mod backend;
pub mod batch;
pub mod config;
pub mod discovery;
pub mod logging;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
