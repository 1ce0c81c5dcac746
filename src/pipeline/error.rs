//! Errors that end a run

use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema setup failed: {0}")]
    Schema(#[source] SinkError),

    #[error("Transaction {operation} failed: {source}")]
    Transaction {
        operation: &'static str,
        #[source]
        source: SinkError,
    },

    #[error("Sink {operation} failed on {table} for key {key}: {source}")]
    Sink {
        operation: &'static str,
        table: &'static str,
        key: String,
        #[source]
        source: SinkError,
    },

    #[error("Traversal of {type_name} failed: {source}")]
    Traversal {
        type_name: String,
        #[source]
        source: StorageError,
    },

    #[error("A refresh is already running on this controller")]
    RunInProgress,

    #[error("{original}; rollback also failed: {rollback}")]
    RollbackFailed {
        original: Box<SyncError>,
        rollback: SinkError,
    },
}

impl SyncError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Schema(_) => "schema",
            Self::Transaction { .. } => "transaction",
            Self::Sink { .. } => "sink",
            Self::Traversal { .. } => "traversal",
            Self::RunInProgress => "run_in_progress",
            Self::RollbackFailed { .. } => "rollback_failed",
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
