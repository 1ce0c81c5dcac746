//! metasync: incremental metadata harvest and synchronization
//!
//! Walks a typed metadata graph (elements, relationships, classifications),
//! enriches each interesting element with related facts, projects it into
//! flat relational rows, and appends only the rows that changed since the
//! last run. Each run is one sink transaction: it commits completely or not
//! at all.
//!
//! # Components
//!
//! - **Traversal** ([`traverse`]): exhaustive paging and cycle-safe descent
//! - **Enrichment** ([`enrich`]): location, license, tags, counters, correlation, hierarchy
//! - **Projection** ([`projection`]): enriched element to typed row
//! - **Gate** ([`gate`]): append only when a stored column changed
//! - **Controller** ([`pipeline`]): one transaction per run
//!
//! # Example
//!
//! ```
//! use metasync::{MemoryAuditLog, OpenSink, OpenStore, SqliteSink, SqliteStore, SyncConfig, SyncController};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open_in_memory().unwrap());
//! let sink = Arc::new(SqliteSink::open_in_memory().unwrap());
//! let controller = SyncController::new(store, sink, Arc::new(MemoryAuditLog::new()), SyncConfig::default()).unwrap();
//! let report = controller.refresh().unwrap();
//! assert_eq!(report.elements_visited, 0);
//! ```

pub mod audit;
pub mod config;
pub mod enrich;
pub mod gate;
pub mod graph;
pub mod pipeline;
pub mod projection;
pub mod sink;
pub mod storage;
pub mod traverse;

#[cfg(test)]
mod test_support;

pub use audit::{AuditEntry, AuditLog, MemoryAuditLog, TracingAuditLog};
pub use config::{ConfigError, SyncConfig, TypeFailurePolicy};
pub use graph::{
    Classification, Direction, Element, ElementId, PropertyValue, Provenance, ProvenanceCategory,
    Relationship, RelationshipId, VersionInfo,
};
pub use pipeline::{ElementKind, RunReport, SyncController, SyncError, SyncResult, TypeRegistry};
pub use projection::{ColumnValue, RowRecord};
pub use sink::{OpenSink, RelationalSink, SinkError, SqliteSink, TableDef};
pub use storage::{MetadataStore, OpenStore, PageCursor, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
