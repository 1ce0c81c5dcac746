//! Batch/transaction controller
//!
//! `ENSURE_SCHEMA -> BEGIN -> (traverse, enrich, project, gate, insert) per
//! type -> COMMIT`, or `ROLLBACK` and a fatal [`SyncError`]. No run ever
//! leaves a partial commit behind.

mod controller;
mod error;
mod harvest;
pub mod registry;
mod report;

pub use controller::SyncController;
pub use error::{SyncError, SyncResult};
pub use registry::{ElementKind, TypeRegistry};
pub use report::{RunReport, TableCounts};
