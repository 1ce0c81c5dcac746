//! Fixed property-to-column mapping tables and value coercion

use super::row::{frame_list, ColumnValue, RowRecord};
use crate::graph::vocab::classifications;
use crate::graph::{Element, Properties, PropertyValue};
use crate::sink::schema::{ColumnType, TableDef};

/// Element property copied into a table column
#[derive(Debug, Clone, Copy)]
pub struct PropertyColumn {
    pub property: &'static str,
    pub column: &'static str,
}

const fn map(property: &'static str, column: &'static str) -> PropertyColumn {
    PropertyColumn { property, column }
}

pub const ASSET_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("versionIdentifier", "version_identifier"),
    map("deployedImplementationType", "deployed_implementation_type"),
];

pub const DATA_FIELD_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("dataType", "data_type"),
    map("position", "position"),
    map("minCardinality", "min_cardinality"),
    map("maxCardinality", "max_cardinality"),
    map("isNullable", "is_nullable"),
];

pub const GLOSSARY_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("language", "language"),
    map("usage", "usage"),
];

pub const TERM_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("summary", "summary"),
    map("description", "description"),
    map("examples", "examples"),
    map("abbreviation", "abbreviation"),
    map("usage", "usage"),
];

pub const COLLECTION_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
];

pub const PROJECT_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("projectStatus", "project_status"),
    map("startDate", "start_date"),
    map("plannedEndDate", "planned_end_date"),
];

pub const TEAM_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("teamType", "team_type"),
];

pub const LOCATION_PROPERTIES: &[PropertyColumn] = &[
    map("qualifiedName", "qualified_name"),
    map("description", "description"),
    map("coordinates", "coordinates"),
    map("mapProjection", "map_projection"),
    map("postalAddress", "postal_address"),
];

/// Relationship properties of a certification
pub const CERTIFICATION_PROPERTIES: &[PropertyColumn] = &[
    map("certificateGUID", "certificate_guid"),
    map("certifiedBy", "certified_by"),
    map("custodian", "custodian"),
    map("recipient", "recipient"),
    map("notes", "notes"),
];

/// Convert a property to the column's type. A value of the wrong type is null.
pub fn coerce(value: Option<&PropertyValue>, ty: ColumnType) -> ColumnValue {
    let Some(value) = value else {
        return ColumnValue::Null;
    };
    match (ty, value) {
        (ColumnType::Text, PropertyValue::String(s)) => ColumnValue::Text(s.clone()),
        (ColumnType::Text, PropertyValue::Array(items)) => {
            if items.iter().all(|item| item.as_str().is_some()) {
                ColumnValue::Text(frame_list(items.iter().filter_map(PropertyValue::as_str)))
            } else {
                ColumnValue::Null
            }
        }
        (ColumnType::Integer, PropertyValue::Int(i)) => ColumnValue::Integer(*i),
        (ColumnType::Boolean, PropertyValue::Bool(b)) => ColumnValue::Boolean(*b),
        (ColumnType::Timestamp, v) => v.as_timestamp().into(),
        _ => ColumnValue::Null,
    }
}

/// Copy every mapped property into `row`, typed by `table`
pub fn apply_properties(
    row: &mut RowRecord,
    table: &TableDef,
    properties: &Properties,
    mapping: &[PropertyColumn],
) {
    for entry in mapping {
        match table.column(entry.column) {
            Some(column) => row.set(entry.column, coerce(properties.get(entry.property), column.ty)),
            None => tracing::warn!(table = table.name, column = entry.column, "mapped column not in table"),
        }
    }
}

/// Provenance and version columns
pub fn apply_header(row: &mut RowRecord, element: &Element) {
    let provenance = &element.provenance;
    let version = &element.version_info;
    row.set("element_type", element.type_name.as_str());
    row.set("metadata_collection_id", provenance.metadata_collection_id.clone());
    row.set("metadata_collection_name", provenance.metadata_collection_name.clone());
    row.set("provenance_type", provenance.category.as_str());
    row.set("created_by", version.created_by.clone());
    row.set("create_time", version.created_at);
    row.set("updated_by", version.updated_by.clone());
    row.set("update_time", version.updated_at);
    row.set("maintained_by", frame_list(&version.maintained_by));
    row.set("version", version.version);
}

fn level(element: &Element, classification: &str) -> Option<ColumnValue> {
    let found = element.classification(classification)?;
    Some(match found.properties.get("levelIdentifier") {
        None => ColumnValue::Null,
        Some(PropertyValue::Int(level)) => ColumnValue::Integer(*level),
        Some(_) => ColumnValue::Integer(0),
    })
}

/// Classification columns the table declares, set only for classifications present
pub fn apply_classifications(row: &mut RowRecord, table: &TableDef, element: &Element) {
    let levels = [
        (classifications::CONFIDENTIALITY, "confidentiality_level"),
        (classifications::CONFIDENCE, "confidence_level"),
        (classifications::CRITICALITY, "criticality_level"),
    ];
    for (classification, column) in levels {
        if table.has_column(column) {
            if let Some(value) = level(element, classification) {
                row.set(column, value);
            }
        }
    }

    if table.has_column("owner") {
        if let Some(ownership) = element.classification(classifications::OWNERSHIP) {
            let props = &ownership.properties;
            row.set("owner", coerce(props.get("owner"), ColumnType::Text));
            row.set("owner_type", coerce(props.get("ownerTypeName"), ColumnType::Text));
        }
    }

    if table.has_column("zone_membership") {
        if let Some(zones) = element.classification(classifications::ASSET_ZONE_MEMBERSHIP) {
            let value = match zones.properties.get("zoneMembership") {
                Some(PropertyValue::Array(items)) => {
                    ColumnValue::Text(frame_list(items.iter().filter_map(PropertyValue::as_str)))
                }
                _ => ColumnValue::Null,
            };
            row.set("zone_membership", value);
        }
    }

    if table.has_column("origin_organization") {
        if let Some(origin) = element.classification(classifications::DIGITAL_RESOURCE_ORIGIN) {
            let props = &origin.properties;
            row.set("origin_organization", coerce(props.get("organization"), ColumnType::Text));
            row.set(
                "origin_business_capability",
                coerce(props.get("businessCapability"), ColumnType::Text),
            );
        }
    }
}
