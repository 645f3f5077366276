//! Batch orchestration over discovered units.
//!
//! This module ties discovery, configuration and the analysis backend
//! together into a single sequential run. Each discovered unit walks
//! through the same stages:
//!
//! ```text
//! BatchRunner
//!     ├── provision output root
//!     ├── load pipeline configuration (once)
//!     ├── discover units
//!     └── per unit: reader -> probe -> pipeline -> run
//! ```
//!
//! Unit failures are isolated: they are recorded in the [`BatchReport`]
//! with the stage that failed, and the batch carries on with the next
//! unit. Only setup failures abort the whole run.
//!
//! # Example
//!
//! ```ignore
//! use mbd_core::backend::ProcessBackend;
//! use mbd_core::batch::BatchRunner;
//!
//! let backend = ProcessBackend::from_settings(&settings);
//! let report = BatchRunner::new(settings, backend).run()?;
//! println!("{}/{} units succeeded", report.succeeded, report.attempted);
//! ```

mod errors;
mod report;
mod runner;

pub use errors::{BatchError, BatchResult, UnitError, UnitStage};
pub use report::{BatchReport, UnitReport, UnitStatus};
pub use runner::BatchRunner;
