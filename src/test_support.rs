//! Shared fixtures for unit tests

use crate::graph::{Direction, Element, ElementId, RelatedElementView, Relationship, RelationshipId};
use crate::storage::{MetadataStore, OpenStore, PageCursor, SqliteStore, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn seeded_store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

/// Store wrapper that fails selected reads
pub struct FlakyStore {
    inner: SqliteStore,
    failing_type: Option<(String, usize)>,
    failing_elements: HashSet<ElementId>,
    failing_exact_search: bool,
    pub related_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            failing_type: None,
            failing_elements: HashSet::new(),
            failing_exact_search: false,
            related_calls: AtomicUsize::new(0),
        }
    }

    /// Fail `elements_by_type(type_name)` for every page starting at or after `start`
    pub fn failing_type_page(mut self, type_name: &str, start: usize) -> Self {
        self.failing_type = Some((type_name.to_string(), start));
        self
    }

    /// Fail `related_elements` whenever it starts from `id`
    pub fn failing_element(mut self, id: &str) -> Self {
        self.failing_elements.insert(ElementId::from_string(id));
        self
    }

    pub fn failing_exact_search(mut self) -> Self {
        self.failing_exact_search = true;
        self
    }

    fn unavailable(what: &str) -> StorageError {
        StorageError::Unavailable(format!("injected failure: {what}"))
    }
}

impl MetadataStore for FlakyStore {
    fn elements_by_type(&self, type_name: &str, page: PageCursor) -> StorageResult<Vec<Element>> {
        if let Some((failing, start)) = &self.failing_type {
            if failing == type_name && page.start >= *start {
                return Err(Self::unavailable(type_name));
            }
        }
        self.inner.elements_by_type(type_name, page)
    }

    fn related_elements(
        &self,
        id: &ElementId,
        direction: Direction,
        relationship_type: Option<&str>,
        page: PageCursor,
    ) -> StorageResult<Vec<RelatedElementView>> {
        self.related_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_elements.contains(id) {
            return Err(Self::unavailable(id.as_str()));
        }
        self.inner.related_elements(id, direction, relationship_type, page)
    }

    fn element_by_guid(&self, id: &ElementId) -> StorageResult<Option<Element>> {
        self.inner.element_by_guid(id)
    }

    fn find_elements_by_exact_property(
        &self,
        type_name: &str,
        property: &str,
        value: &str,
    ) -> StorageResult<Vec<Element>> {
        if self.failing_exact_search {
            return Err(Self::unavailable(property));
        }
        self.inner.find_elements_by_exact_property(type_name, property, value)
    }

    fn relationship_by_guid(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        self.inner.relationship_by_guid(id)
    }
}
