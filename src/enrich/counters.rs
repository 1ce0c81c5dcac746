//! Collaboration counters gathered in one pass over an element's relationships

use super::Resolvers;
use crate::graph::vocab::relationships;
use crate::graph::{Direction, ElementId, PropertyValue, RelationshipId};
use crate::storage::StorageResult;
use crate::traverse::{count_reachable, for_each_related};
use std::collections::BTreeSet;

/// A certification attached to an element, by relationship id
#[derive(Debug, Clone, PartialEq)]
pub struct CertificationRef {
    pub relationship: RelationshipId,
    pub certification_type: ElementId,
    pub certification_type_name: Option<String>,
}

/// Everything counted while scanning an element's outgoing relationships
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollaborationCounters {
    pub comments: usize,
    pub ratings: usize,
    pub star_total: i64,
    pub tags: usize,
    pub likes: usize,
    pub related_assets: usize,
    pub terms: usize,
    pub categories: usize,
    pub members: usize,
    /// Distinct type names of direct collection members, sorted
    pub member_types: BTreeSet<String>,
    pub certifications: Vec<CertificationRef>,
    /// First schema type attached to an asset
    pub schema_type: Option<ElementId>,
}

/// Star value of a rating: `NoRecommendation` (0) through `FiveStars` (5),
/// or the same range as an integer ordinal. Anything else counts as 0.
pub fn rating_stars(value: Option<&PropertyValue>) -> i64 {
    match value {
        Some(PropertyValue::Int(n)) if (0..=5).contains(n) => *n,
        Some(PropertyValue::String(name)) => match name.to_ascii_lowercase().replace(['_', ' '], "").as_str() {
            "onestar" => 1,
            "twostars" => 2,
            "threestars" => 3,
            "fourstars" => 4,
            "fivestars" => 5,
            _ => 0,
        },
        _ => 0,
    }
}

impl Resolvers<'_> {
    /// Scan every outgoing relationship of `id` once and classify it.
    ///
    /// Each comment counts as one plus every reply reachable beneath it.
    /// `RelatedAsset` is counted in both directions.
    pub fn collaboration_counters(&self, id: &ElementId) -> StorageResult<CollaborationCounters> {
        let mut counters = CollaborationCounters::default();

        for view in for_each_related(self.store, id, None, Direction::Outgoing, self.page_size) {
            let view = view?;
            match view.relationship.type_name.as_str() {
                relationships::ATTACHED_TAG => counters.tags += 1,
                relationships::ATTACHED_LIKE => counters.likes += 1,
                relationships::ATTACHED_RATING => {
                    counters.ratings += 1;
                    counters.star_total += rating_stars(view.element.property("stars"));
                }
                relationships::ATTACHED_COMMENT => {
                    counters.comments += 1 + self.nested_comment_count(&view.element.id)?;
                }
                relationships::CERTIFICATION => counters.certifications.push(CertificationRef {
                    relationship: view.relationship.id.clone(),
                    certification_type: view.element.id.clone(),
                    certification_type_name: view.element.display_name().map(str::to_string),
                }),
                relationships::ASSET_SCHEMA_TYPE => {
                    if counters.schema_type.is_none() {
                        counters.schema_type = Some(view.element.id.clone());
                    }
                }
                relationships::RELATED_ASSET => counters.related_assets += 1,
                relationships::TERM_ANCHOR => counters.terms += 1,
                relationships::CATEGORY_ANCHOR => counters.categories += 1,
                relationships::COLLECTION_MEMBERSHIP => {
                    counters.members += 1;
                    counters.member_types.insert(view.element.type_name.clone());
                }
                _ => {}
            }
        }

        // related assets are symmetric: links where `id` is the far end count too
        for view in for_each_related(
            self.store,
            id,
            Some(relationships::RELATED_ASSET),
            Direction::Incoming,
            self.page_size,
        ) {
            let view = view?;
            if view.relationship.end1 != view.relationship.end2 {
                counters.related_assets += 1;
            }
        }

        Ok(counters)
    }

    /// Replies reachable beneath `comment` (the comment itself excluded)
    pub fn nested_comment_count(&self, comment: &ElementId) -> StorageResult<usize> {
        count_reachable(
            self.store,
            comment,
            relationships::ATTACHED_COMMENT,
            self.page_size,
            self.max_depth,
        )
    }
}
