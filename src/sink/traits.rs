//! Relational sink trait definitions

use super::schema::TableDef;
use crate::projection::{ColumnValue, RowRecord};
use std::path::Path;
use thiserror::Error;

/// Errors raised by the relational sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error on {table}: {message}")]
    Schema { table: String, message: String },

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Column {column} is not part of table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Cannot decode {table}.{column}: {message}")]
    Decode {
        table: String,
        column: String,
        message: String,
    },

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

impl SinkError {
    /// Short, stable name of the error class for audit records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Io(_) => "io",
            Self::Schema { .. } => "schema",
            Self::Transaction(_) => "transaction",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::Decode { .. } => "decode",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Business-key column values identifying one logical row
pub type RowKey = [(&'static str, ColumnValue)];

/// Append-only relational history store
///
/// One transaction at a time. Implementations must be thread-safe
/// (Send + Sync) but are only ever driven by a single run.
pub trait RelationalSink: Send + Sync {
    /// Create missing tables, columns, and indexes. Idempotent.
    fn ensure_schema(&self, tables: &[&TableDef]) -> SinkResult<()>;

    fn begin(&self) -> SinkResult<()>;

    fn commit(&self) -> SinkResult<()>;

    fn rollback(&self) -> SinkResult<()>;

    /// The most recently inserted row for `key`, every column of the table included
    fn latest_row(&self, table: &TableDef, key: &RowKey) -> SinkResult<Option<RowRecord>>;

    /// Append a row. Columns absent from `row` are stored as null.
    fn insert_row(&self, table: &TableDef, row: &RowRecord) -> SinkResult<()>;
}

/// Extension trait for opening sinks from paths
pub trait OpenSink: RelationalSink + Sized {
    fn open(path: impl AsRef<Path>) -> SinkResult<Self>;

    fn open_in_memory() -> SinkResult<Self>;
}
