//! Store and sink wrappers that fail or block on demand

use metasync::sink::RowKey;
use metasync::{
    Direction, Element, ElementId, MetadataStore, PageCursor, Relationship, RelationshipId,
    RelationalSink, RowRecord, SinkError, SqliteSink, SqliteStore, StorageError, StorageResult,
    TableDef,
};
use metasync::graph::RelatedElementView;
use metasync::sink::SinkResult;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

/// Reads through to a SQLite store, failing selected calls
pub struct FailingStore {
    inner: Arc<SqliteStore>,
    failing_types: HashSet<String>,
    failing_elements: HashSet<ElementId>,
}

impl FailingStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            failing_types: HashSet::new(),
            failing_elements: HashSet::new(),
        }
    }

    pub fn failing_type(mut self, type_name: &str) -> Self {
        self.failing_types.insert(type_name.to_string());
        self
    }

    /// Fail every relationship lookup starting from `id`
    pub fn failing_element(mut self, id: &str) -> Self {
        self.failing_elements.insert(ElementId::from_string(id));
        self
    }
}

impl MetadataStore for FailingStore {
    fn elements_by_type(&self, type_name: &str, page: PageCursor) -> StorageResult<Vec<Element>> {
        if self.failing_types.contains(type_name) {
            return Err(StorageError::Unavailable(format!("{type_name} pages unavailable")));
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
        if self.failing_elements.contains(id) {
            return Err(StorageError::Unavailable(format!("relationships of {id} unavailable")));
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
        self.inner.find_elements_by_exact_property(type_name, property, value)
    }

    fn relationship_by_guid(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        self.inner.relationship_by_guid(id)
    }
}

/// Fails the `fail_on`-th insert (1-based) of a run
pub struct FailingSink {
    inner: Arc<SqliteSink>,
    fail_on: usize,
    inserts: AtomicUsize,
}

impl FailingSink {
    pub fn new(inner: Arc<SqliteSink>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn attempted_inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

impl RelationalSink for FailingSink {
    fn ensure_schema(&self, tables: &[&TableDef]) -> SinkResult<()> {
        self.inner.ensure_schema(tables)
    }

    fn begin(&self) -> SinkResult<()> {
        self.inner.begin()
    }

    fn commit(&self) -> SinkResult<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> SinkResult<()> {
        self.inner.rollback()
    }

    fn latest_row(&self, table: &TableDef, key: &RowKey) -> SinkResult<Option<RowRecord>> {
        self.inner.latest_row(table, key)
    }

    fn insert_row(&self, table: &TableDef, row: &RowRecord) -> SinkResult<()> {
        let attempt = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(SinkError::Unavailable(format!("insert {attempt} into {} refused", table.name)));
        }
        self.inner.insert_row(table, row)
    }
}

/// Parks the first `ensure_schema` call until the test lets it go
///
/// The test and the parked run meet twice at the barrier: once when the
/// run has entered, once to release it.
pub struct BlockingSink {
    inner: Arc<SqliteSink>,
    barrier: Arc<Barrier>,
    parked: AtomicBool,
}

impl BlockingSink {
    pub fn new(inner: Arc<SqliteSink>, barrier: Arc<Barrier>) -> Self {
        Self {
            inner,
            barrier,
            parked: AtomicBool::new(false),
        }
    }
}

impl RelationalSink for BlockingSink {
    fn ensure_schema(&self, tables: &[&TableDef]) -> SinkResult<()> {
        if !self.parked.swap(true, Ordering::SeqCst) {
            self.barrier.wait();
            self.barrier.wait();
        }
        self.inner.ensure_schema(tables)
    }

    fn begin(&self) -> SinkResult<()> {
        self.inner.begin()
    }

    fn commit(&self) -> SinkResult<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> SinkResult<()> {
        self.inner.rollback()
    }

    fn latest_row(&self, table: &TableDef, key: &RowKey) -> SinkResult<Option<RowRecord>> {
        self.inner.latest_row(table, key)
    }

    fn insert_row(&self, table: &TableDef, row: &RowRecord) -> SinkResult<()> {
        self.inner.insert_row(table, row)
    }
}
