//! Metadata graph storage
//!
//! The harvester reads the graph through the read-only `MetadataStore`
//! trait. `SqliteStore` is the bundled implementation; it also carries the
//! authoring methods used to populate a repository.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{MetadataStore, OpenStore, PageCursor, StorageError, StorageResult};
