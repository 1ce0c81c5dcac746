//! One projection function per target table
//!
//! Projection is pure: everything a row needs is resolved beforehand and
//! passed in. A fact that could not be resolved is `None` and lands as null.

use super::mapping::{
    apply_classifications, apply_header, apply_properties, PropertyColumn, ASSET_PROPERTIES,
    CERTIFICATION_PROPERTIES, COLLECTION_PROPERTIES, DATA_FIELD_PROPERTIES, GLOSSARY_PROPERTIES,
    LOCATION_PROPERTIES, PROJECT_PROPERTIES, TEAM_PROPERTIES, TERM_PROPERTIES,
};
use super::row::{frame_list, RowRecord};
use crate::enrich::{CertificationRef, CollaborationCounters, CorrelationRecord};
use crate::graph::{Element, ElementId, Relationship};
use crate::sink::schema::{self, TableDef};
use crate::traverse::Leaf;
use std::collections::BTreeSet;

/// Auxiliary facts resolved for an asset
#[derive(Debug, Default)]
pub struct AssetFacts {
    pub license: Option<Element>,
    pub location: Option<Element>,
    pub semantic_term: Option<Element>,
    pub tags: Option<String>,
}

fn element_row(table: &TableDef, key: &str, element: &Element, mapping: &[PropertyColumn]) -> RowRecord {
    let mut row = RowRecord::stamped();
    row.set(key, element.id.as_str());
    row.set("display_name", element.display_name().map(str::to_string));
    apply_properties(&mut row, table, &element.properties, mapping);
    apply_classifications(&mut row, table, element);
    apply_header(&mut row, element);
    row
}

fn id_of(element: Option<&Element>) -> Option<String> {
    element.map(|e| e.id.to_string())
}

fn name_of(element: Option<&Element>) -> Option<String> {
    element.and_then(Element::display_name).map(str::to_string)
}

pub fn project_asset(asset: &Element, facts: &AssetFacts) -> RowRecord {
    let mut row = element_row(&schema::ASSET, "asset_guid", asset, ASSET_PROPERTIES);
    row.set("license_guid", id_of(facts.license.as_ref()));
    row.set("license_name", name_of(facts.license.as_ref()));
    row.set("location_guid", id_of(facts.location.as_ref()));
    row.set("location_name", name_of(facts.location.as_ref()));
    row.set("semantic_term_guid", id_of(facts.semantic_term.as_ref()));
    row.set("tags", facts.tags.clone());
    row
}

pub fn project_asset_collaboration(asset: &ElementId, counters: &CollaborationCounters) -> RowRecord {
    RowRecord::stamped()
        .with("asset_guid", asset.as_str())
        .with("num_comments", counters.comments)
        .with("num_ratings", counters.ratings)
        .with("star_total", counters.star_total)
        .with("num_tags", counters.tags)
        .with("num_likes", counters.likes)
        .with("num_certifications", counters.certifications.len())
        .with("num_related_assets", counters.related_assets)
        .with("schema_type_guid", counters.schema_type.as_ref().map(ElementId::to_string))
}

/// A leaf schema attribute reached from `asset`
pub fn project_data_field(
    asset: &ElementId,
    leaf: &Leaf,
    semantic_term: Option<&Element>,
    tags: Option<&str>,
) -> RowRecord {
    let mut row = element_row(&schema::DATA_FIELD, "field_guid", &leaf.element, DATA_FIELD_PROPERTIES);
    row.set("asset_guid", asset.as_str());
    row.set("parent_guid", leaf.parent.as_str());
    row.set("depth", leaf.depth);
    row.set("semantic_term_guid", id_of(semantic_term));
    row.set("tags", tags.map(str::to_string));
    row
}

pub fn project_glossary(glossary: &Element, counters: Option<&CollaborationCounters>) -> RowRecord {
    let mut row = element_row(&schema::GLOSSARY, "glossary_guid", glossary, GLOSSARY_PROPERTIES);
    row.set("num_terms", counters.map(|c| c.terms));
    row.set("num_categories", counters.map(|c| c.categories));
    row
}

pub fn project_term(term: &Element, glossary: Option<&Element>, tags: Option<&str>) -> RowRecord {
    let mut row = element_row(&schema::TERM, "term_guid", term, TERM_PROPERTIES);
    row.set("glossary_guid", id_of(glossary));
    row.set("tags", tags.map(str::to_string));
    row
}

/// `leaves` are the members reached through nested collections
pub fn project_collection(
    collection: &Element,
    direct_members: Option<usize>,
    leaves: Option<&[Leaf]>,
) -> RowRecord {
    let mut row = element_row(&schema::COLLECTION, "collection_guid", collection, COLLECTION_PROPERTIES);
    row.set("num_members", leaves.map(<[Leaf]>::len));
    row.set("num_direct_members", direct_members);
    row.set(
        "member_types",
        leaves.map(|leaves| {
            let types: BTreeSet<&str> = leaves.iter().map(|l| l.element.type_name.as_str()).collect();
            frame_list(types)
        }),
    );
    row
}

pub fn project_project(project: &Element, parent: Option<&Element>) -> RowRecord {
    let mut row = element_row(&schema::PROJECT, "project_guid", project, PROJECT_PROPERTIES);
    row.set("parent_project_guid", id_of(parent));
    row.set("parent_project_name", name_of(parent));
    row
}

pub fn project_team(team: &Element, parent: Option<&Element>, organization: Option<&str>) -> RowRecord {
    let mut row = element_row(&schema::TEAM, "team_guid", team, TEAM_PROPERTIES);
    row.set("parent_team_guid", id_of(parent));
    row.set("organization_name", organization.map(str::to_string));
    row
}

pub fn project_location(location: &Element, parent: Option<&Element>) -> RowRecord {
    let mut row = element_row(&schema::LOCATION, "location_guid", location, LOCATION_PROPERTIES);
    row.set("parent_location_guid", id_of(parent));
    row
}

/// Keyed by relationship id; dates come from the effective window
pub fn project_certification(
    subject: &ElementId,
    certification: &CertificationRef,
    relationship: &Relationship,
) -> RowRecord {
    let mut row = RowRecord::stamped()
        .with("certification_guid", relationship.id.as_str())
        .with("referenceable_guid", subject.as_str())
        .with("certification_type_guid", certification.certification_type.as_str())
        .with("certification_type_name", certification.certification_type_name.clone());
    apply_properties(
        &mut row,
        &schema::CERTIFICATION,
        &relationship.properties,
        CERTIFICATION_PROPERTIES,
    );
    row.set("start_date", relationship.effective_from);
    row.set("end_date", relationship.effective_to);
    row
}

pub fn project_correlation(element: &ElementId, record: &CorrelationRecord) -> RowRecord {
    RowRecord::stamped()
        .with("element_guid", element.as_str())
        .with("external_system_guid", record.external_system_guid.as_str())
        .with("external_system_name", record.external_system_name.clone())
        .with("external_identifier", record.external_identifier.clone())
        .with("external_created_by", record.created_by.clone())
        .with("external_created_by_guid", record.created_by_guid.as_ref().map(ElementId::to_string))
        .with("external_updated_by", record.updated_by.clone())
        .with("external_updated_by_guid", record.updated_by_guid.as_ref().map(ElementId::to_string))
        .with("last_synchronized", record.last_synchronized)
}
