//! Lazy, exhaustive paging over the metadata store

use crate::graph::{Direction, Element, ElementId, RelatedElementView};
use crate::storage::{MetadataStore, PageCursor, StorageError, StorageResult};
use std::collections::{HashSet, VecDeque};

/// Buffered pager shared by both sequence kinds
///
/// Requests pages at offsets 0, `page_size`, `2 * page_size`, ... and stops
/// only when a page comes back empty. After yielding an error it is fused.
struct Pager<T> {
    cursor: PageCursor,
    buffer: VecDeque<T>,
    done: bool,
    pages_fetched: usize,
}

impl<T> Pager<T> {
    fn new(page_size: usize) -> Self {
        Self {
            cursor: PageCursor::first(page_size.max(1)),
            buffer: VecDeque::new(),
            done: false,
            pages_fetched: 0,
        }
    }

    fn next_with<F>(&mut self, mut fetch: F) -> Option<StorageResult<T>>
    where
        F: FnMut(PageCursor) -> StorageResult<Vec<T>>,
    {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            let page = match fetch(self.cursor) {
                Ok(page) => page,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            self.pages_fetched += 1;
            if page.is_empty() {
                self.done = true;
                return None;
            }
            self.cursor = self.cursor.next();
            self.buffer.extend(page);
        }
    }
}

/// Every element of one type (subtypes included), page by page
///
/// Created by [`for_each_of_type`]. Elements already yielded in this
/// sequence are not yielded again even if the store shifts between pages.
pub struct ElementPages<'a> {
    store: &'a dyn MetadataStore,
    type_name: String,
    pager: Pager<Element>,
    seen: HashSet<ElementId>,
}

impl ElementPages<'_> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of page requests that returned data or the terminating empty page
    pub fn pages_fetched(&self) -> usize {
        self.pager.pages_fetched
    }
}

impl Iterator for ElementPages<'_> {
    type Item = Result<Element, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let store = self.store;
            let type_name = self.type_name.as_str();
            let item = self
                .pager
                .next_with(|cursor| store.elements_by_type(type_name, cursor))?;
            match item {
                Ok(element) if !self.seen.insert(element.id.clone()) => {
                    tracing::debug!(element = %element.id, "skipping element repeated across pages");
                }
                other => return Some(other),
            }
        }
    }
}

/// Every relationship of one type touching an element, page by page
///
/// Created by [`for_each_related`].
pub struct RelatedPages<'a> {
    store: &'a dyn MetadataStore,
    origin: ElementId,
    relationship_type: Option<String>,
    direction: Direction,
    pager: Pager<RelatedElementView>,
}

impl Iterator for RelatedPages<'_> {
    type Item = Result<RelatedElementView, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        let origin = &self.origin;
        let relationship_type = self.relationship_type.as_deref();
        let direction = self.direction;
        self.pager.next_with(|cursor| {
            store.related_elements(origin, direction, relationship_type, cursor)
        })
    }
}

/// Lazily visit every element of `type_name`, `page_size` at a time
pub fn for_each_of_type<'a>(
    store: &'a dyn MetadataStore,
    type_name: &str,
    page_size: usize,
) -> ElementPages<'a> {
    ElementPages {
        store,
        type_name: type_name.to_string(),
        pager: Pager::new(page_size),
        seen: HashSet::new(),
    }
}

/// Lazily visit every relationship of `relationship_type` (all types when `None`)
/// touching `origin` in `direction`
pub fn for_each_related<'a>(
    store: &'a dyn MetadataStore,
    origin: &ElementId,
    relationship_type: Option<&str>,
    direction: Direction,
    page_size: usize,
) -> RelatedPages<'a> {
    RelatedPages {
        store,
        origin: origin.clone(),
        relationship_type: relationship_type.map(str::to_string),
        direction,
        pager: Pager::new(page_size),
    }
}

/// The first related element in page order, if any
pub fn first_related(
    store: &dyn MetadataStore,
    origin: &ElementId,
    relationship_type: &str,
    direction: Direction,
) -> StorageResult<Option<RelatedElementView>> {
    for_each_related(store, origin, Some(relationship_type), direction, 1)
        .next()
        .transpose()
}
