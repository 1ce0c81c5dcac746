//! Metadata store trait definitions

use crate::graph::{Direction, Element, ElementId, RelatedElementView, Relationship, RelationshipId};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading the metadata graph
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Short, stable name of the error class for audit records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Serialization(_) => "serialization",
            Self::ElementNotFound(_) => "element_not_found",
            Self::Io(_) => "io",
            Self::DateParse(_) => "date_parse",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One page request: `page_size` items starting at offset `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub start: usize,
    pub page_size: usize,
}

impl PageCursor {
    pub fn first(page_size: usize) -> Self {
        Self { start: 0, page_size }
    }

    /// Cursor for the page following this one
    pub fn next(self) -> Self {
        Self {
            start: self.start + self.page_size,
            page_size: self.page_size,
        }
    }
}

/// Read-only view of the metadata graph
///
/// This is the only surface the harvester sees. There are no write
/// operations here: the pipeline never mutates the graph it reads.
/// Implementations must be thread-safe (Send + Sync).
pub trait MetadataStore: Send + Sync {
    /// One page of elements of `type_name` or any of its subtypes.
    /// An empty page means the sequence is exhausted.
    fn elements_by_type(&self, type_name: &str, page: PageCursor) -> StorageResult<Vec<Element>>;

    /// One page of relationships touching `id`, paired with their far-end element.
    /// `relationship_type = None` returns every relationship type.
    fn related_elements(
        &self,
        id: &ElementId,
        direction: Direction,
        relationship_type: Option<&str>,
        page: PageCursor,
    ) -> StorageResult<Vec<RelatedElementView>>;

    fn element_by_guid(&self, id: &ElementId) -> StorageResult<Option<Element>>;

    /// Elements of `type_name` whose string property `property` equals `value` exactly
    fn find_elements_by_exact_property(
        &self,
        type_name: &str,
        property: &str,
        value: &str,
    ) -> StorageResult<Vec<Element>>;

    fn relationship_by_guid(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: MetadataStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
