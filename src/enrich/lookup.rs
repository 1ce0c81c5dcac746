//! Single-hop lookups

use super::{CertificationRef, Resolvers};
use crate::graph::vocab::relationships;
use crate::graph::{Direction, Element, ElementId, Relationship};
use crate::projection::frame_list;
use crate::storage::StorageResult;
use crate::traverse::{first_related, for_each_related};

impl Resolvers<'_> {
    fn first_outgoing(&self, id: &ElementId, relationship: &str) -> StorageResult<Option<Element>> {
        Ok(first_related(self.store, id, relationship, Direction::Outgoing)?.map(|view| view.element))
    }

    pub fn associated_location(&self, id: &ElementId) -> StorageResult<Option<Element>> {
        self.first_outgoing(id, relationships::ASSET_LOCATION)
    }

    pub fn associated_license(&self, id: &ElementId) -> StorageResult<Option<Element>> {
        self.first_outgoing(id, relationships::LICENSE)
    }

    pub fn associated_semantic_term(&self, id: &ElementId) -> StorageResult<Option<Element>> {
        self.first_outgoing(id, relationships::SEMANTIC_ASSIGNMENT)
    }

    /// Every attached tag name as a framed list (`,,` when there are none)
    pub fn associated_tags(&self, id: &ElementId) -> StorageResult<String> {
        let mut names = Vec::new();
        for view in for_each_related(
            self.store,
            id,
            Some(relationships::ATTACHED_TAG),
            Direction::Outgoing,
            self.page_size,
        ) {
            let tag = view?.element;
            if let Some(name) = tag_name(&tag) {
                names.push(name.to_string());
            }
        }
        Ok(frame_list(names))
    }

    /// Current state of a certification relationship found by the counters
    pub fn certification(&self, certification: &CertificationRef) -> StorageResult<Option<Relationship>> {
        self.store.relationship_by_guid(&certification.relationship)
    }
}

fn tag_name(tag: &Element) -> Option<&str> {
    tag.string_property("tagName").or_else(|| tag.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use crate::test_support::{seeded_store, FlakyStore};

    fn asset_with_tags(tags: &[&str]) -> SqliteStore {
        let store = seeded_store();
        store.save_element(&Element::new("DataSet").with_id("asset")).unwrap();
        for (i, tag) in tags.iter().enumerate() {
            let id = format!("tag{i}");
            store
                .save_element(&Element::new("InformalTag").with_id(id.clone()).with_property("tagName", *tag))
                .unwrap();
            store
                .save_relationship(&Relationship::new("AttachedTag", "asset".into(), id.as_str().into()))
                .unwrap();
        }
        store
    }

    #[test]
    fn no_tags_is_two_delimiters() {
        let store = asset_with_tags(&[]);
        let resolvers = Resolvers::new(&store, 10, 8);
        assert_eq!(resolvers.associated_tags(&"asset".into()).unwrap(), ",,");
    }

    #[test]
    fn tags_are_framed_in_page_order() {
        let store = asset_with_tags(&["a", "b"]);
        let resolvers = Resolvers::new(&store, 1, 8);
        assert_eq!(resolvers.associated_tags(&"asset".into()).unwrap(), ",a,b,");
    }

    #[test]
    fn first_location_wins_and_absence_is_none() {
        let store = seeded_store();
        store.save_element(&Element::new("DataSet").with_id("asset")).unwrap();
        store.save_element(&Element::new("DataSet").with_id("bare")).unwrap();
        for id in ["loc1", "loc2"] {
            store.save_element(&Element::new("Location").with_id(id)).unwrap();
            store
                .save_relationship(&Relationship::new("AssetLocation", "asset".into(), id.into()))
                .unwrap();
        }
        let resolvers = Resolvers::new(&store, 10, 8);
        let location = resolvers.associated_location(&"asset".into()).unwrap().unwrap();
        assert_eq!(location.id.as_str(), "loc1");
        assert!(resolvers.associated_location(&"bare".into()).unwrap().is_none());
        assert!(resolvers.associated_license(&"asset".into()).unwrap().is_none());
    }

    #[test]
    fn store_failure_surfaces_as_error() {
        let store = FlakyStore::new(asset_with_tags(&["a"])).failing_element("asset");
        let resolvers = Resolvers::new(&store, 10, 8);
        assert!(resolvers.associated_tags(&"asset".into()).is_err());
        assert!(resolvers.associated_semantic_term(&"asset".into()).is_err());
    }
}
