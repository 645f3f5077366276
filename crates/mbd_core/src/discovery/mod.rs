//! Batch unit discovery.
//!
//! This module turns the configured input tree into a list of batch
//! units: which movie files to process, what each unit's derived output
//! name is, and where its results go. Three strategies are supported:
//! flat (files in one folder), nested (one level of subfolders), and
//! single (one configured file).

mod naming;
mod scan;
mod types;

pub use naming::derive_short_name;
pub use scan::{discover_units, DiscoveryError, DiscoveryResult};
pub use types::{BatchUnit, DiscoveryMode};
