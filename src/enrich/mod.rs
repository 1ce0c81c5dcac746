//! Enrichment resolvers
//!
//! Each resolver answers one question about an element by following one or
//! more relationship types outward. Absence is `Ok(None)` (or an empty
//! value); only a failing store read is an `Err`, which the harvester
//! records and treats as "not available" for that element.

mod correlation;
mod counters;
mod hierarchy;
mod lookup;

pub use correlation::{CorrelationRecord, CorrelationSummary};
pub use counters::{rating_stars, CertificationRef, CollaborationCounters};

use crate::storage::MetadataStore;

/// Resolver family bound to one store and one set of traversal limits
#[derive(Clone, Copy)]
pub struct Resolvers<'a> {
    store: &'a dyn MetadataStore,
    page_size: usize,
    max_depth: usize,
}

impl<'a> Resolvers<'a> {
    pub fn new(store: &'a dyn MetadataStore, page_size: usize, max_depth: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            max_depth: max_depth.max(1),
        }
    }

    pub fn store(&self) -> &'a dyn MetadataStore {
        self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
