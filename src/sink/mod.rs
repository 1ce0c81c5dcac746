//! Relational history sink
//!
//! `RelationalSink` is the transactional, append-only target of a run.
//! `SqliteSink` is the bundled implementation; `schema` defines every
//! target table.

pub mod schema;
mod sqlite;
mod traits;

pub use schema::{ColumnDef, ColumnType, TableDef, ALL_TABLES};
pub use sqlite::SqliteSink;
pub use traits::{OpenSink, RelationalSink, RowKey, SinkError, SinkResult};
