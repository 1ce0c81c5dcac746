//! Target table definitions
//!
//! Every table is an append-only history: one row per observed change of
//! one business key, ordered by `sync_time`.

use crate::projection::SYNC_TIME_COLUMN;

/// SQL storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Text | Self::Timestamp => "TEXT",
            Self::Integer | Self::Boolean => "INTEGER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub const fn text(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Integer }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Boolean }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self { name, ty: ColumnType::Timestamp }
    }
}

/// Provenance and version columns shared by every element-keyed table
pub const HEADER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("element_type"),
    ColumnDef::text("metadata_collection_id"),
    ColumnDef::text("metadata_collection_name"),
    ColumnDef::text("provenance_type"),
    ColumnDef::text("created_by"),
    ColumnDef::timestamp("create_time"),
    ColumnDef::text("updated_by"),
    ColumnDef::timestamp("update_time"),
    ColumnDef::text("maintained_by"),
    ColumnDef::integer("version"),
];

static SYNC_TIME: ColumnDef = ColumnDef::timestamp(SYNC_TIME_COLUMN);

/// One target table
#[derive(Debug, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    /// Columns identifying "the same logical entity over time"
    pub key_columns: &'static [&'static str],
    /// Table-specific columns, key columns included
    pub columns: &'static [ColumnDef],
    /// Whether [`HEADER_COLUMNS`] are part of this table
    pub element_header: bool,
}

impl TableDef {
    /// Every column in DDL order: table columns, header, then `sync_time`
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        let header: &[ColumnDef] = if self.element_header { HEADER_COLUMNS } else { &[] };
        self.columns
            .iter()
            .chain(header.iter())
            .chain(std::iter::once(&SYNC_TIME))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.all_columns().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

pub static ASSET: TableDef = TableDef {
    name: "om_asset",
    key_columns: &["asset_guid"],
    columns: &[
        ColumnDef::text("asset_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("version_identifier"),
        ColumnDef::text("deployed_implementation_type"),
        ColumnDef::text("owner"),
        ColumnDef::text("owner_type"),
        ColumnDef::integer("confidentiality_level"),
        ColumnDef::integer("confidence_level"),
        ColumnDef::integer("criticality_level"),
        ColumnDef::text("zone_membership"),
        ColumnDef::text("origin_organization"),
        ColumnDef::text("origin_business_capability"),
        ColumnDef::text("license_guid"),
        ColumnDef::text("license_name"),
        ColumnDef::text("location_guid"),
        ColumnDef::text("location_name"),
        ColumnDef::text("semantic_term_guid"),
        ColumnDef::text("tags"),
    ],
    element_header: true,
};

pub static ASSET_COLLABORATION: TableDef = TableDef {
    name: "om_asset_collaboration",
    key_columns: &["asset_guid"],
    columns: &[
        ColumnDef::text("asset_guid"),
        ColumnDef::integer("num_comments"),
        ColumnDef::integer("num_ratings"),
        ColumnDef::integer("star_total"),
        ColumnDef::integer("num_tags"),
        ColumnDef::integer("num_likes"),
        ColumnDef::integer("num_certifications"),
        ColumnDef::integer("num_related_assets"),
        ColumnDef::text("schema_type_guid"),
    ],
    element_header: false,
};

pub static DATA_FIELD: TableDef = TableDef {
    name: "om_data_field",
    key_columns: &["field_guid"],
    columns: &[
        ColumnDef::text("field_guid"),
        ColumnDef::text("asset_guid"),
        ColumnDef::text("parent_guid"),
        ColumnDef::integer("depth"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("data_type"),
        ColumnDef::integer("position"),
        ColumnDef::integer("min_cardinality"),
        ColumnDef::integer("max_cardinality"),
        ColumnDef::boolean("is_nullable"),
        ColumnDef::text("semantic_term_guid"),
        ColumnDef::text("tags"),
    ],
    element_header: true,
};

pub static GLOSSARY: TableDef = TableDef {
    name: "om_glossary",
    key_columns: &["glossary_guid"],
    columns: &[
        ColumnDef::text("glossary_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("language"),
        ColumnDef::text("usage"),
        ColumnDef::integer("num_terms"),
        ColumnDef::integer("num_categories"),
    ],
    element_header: true,
};

pub static TERM: TableDef = TableDef {
    name: "om_term",
    key_columns: &["term_guid"],
    columns: &[
        ColumnDef::text("term_guid"),
        ColumnDef::text("glossary_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("summary"),
        ColumnDef::text("description"),
        ColumnDef::text("examples"),
        ColumnDef::text("abbreviation"),
        ColumnDef::text("usage"),
        ColumnDef::text("owner"),
        ColumnDef::text("owner_type"),
        ColumnDef::integer("confidentiality_level"),
        ColumnDef::integer("confidence_level"),
        ColumnDef::integer("criticality_level"),
        ColumnDef::text("tags"),
    ],
    element_header: true,
};

pub static COLLECTION: TableDef = TableDef {
    name: "om_collection",
    key_columns: &["collection_guid"],
    columns: &[
        ColumnDef::text("collection_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::integer("num_members"),
        ColumnDef::integer("num_direct_members"),
        ColumnDef::text("member_types"),
    ],
    element_header: true,
};

pub static PROJECT: TableDef = TableDef {
    name: "om_project",
    key_columns: &["project_guid"],
    columns: &[
        ColumnDef::text("project_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("project_status"),
        ColumnDef::timestamp("start_date"),
        ColumnDef::timestamp("planned_end_date"),
        ColumnDef::text("parent_project_guid"),
        ColumnDef::text("parent_project_name"),
    ],
    element_header: true,
};

pub static TEAM: TableDef = TableDef {
    name: "om_team",
    key_columns: &["team_guid"],
    columns: &[
        ColumnDef::text("team_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("team_type"),
        ColumnDef::text("parent_team_guid"),
        ColumnDef::text("organization_name"),
    ],
    element_header: true,
};

pub static LOCATION: TableDef = TableDef {
    name: "om_location",
    key_columns: &["location_guid"],
    columns: &[
        ColumnDef::text("location_guid"),
        ColumnDef::text("qualified_name"),
        ColumnDef::text("display_name"),
        ColumnDef::text("description"),
        ColumnDef::text("coordinates"),
        ColumnDef::text("map_projection"),
        ColumnDef::text("postal_address"),
        ColumnDef::text("parent_location_guid"),
    ],
    element_header: true,
};

pub static CERTIFICATION: TableDef = TableDef {
    name: "om_certification",
    key_columns: &["certification_guid"],
    columns: &[
        ColumnDef::text("certification_guid"),
        ColumnDef::text("referenceable_guid"),
        ColumnDef::text("certification_type_guid"),
        ColumnDef::text("certification_type_name"),
        ColumnDef::text("certificate_guid"),
        ColumnDef::text("certified_by"),
        ColumnDef::text("custodian"),
        ColumnDef::text("recipient"),
        ColumnDef::text("notes"),
        ColumnDef::timestamp("start_date"),
        ColumnDef::timestamp("end_date"),
    ],
    element_header: false,
};

pub static CORRELATION: TableDef = TableDef {
    name: "om_correlation",
    key_columns: &["element_guid", "external_system_guid"],
    columns: &[
        ColumnDef::text("element_guid"),
        ColumnDef::text("external_system_guid"),
        ColumnDef::text("external_system_name"),
        ColumnDef::text("external_identifier"),
        ColumnDef::text("external_created_by"),
        ColumnDef::text("external_created_by_guid"),
        ColumnDef::text("external_updated_by"),
        ColumnDef::text("external_updated_by_guid"),
        ColumnDef::timestamp("last_synchronized"),
    ],
    element_header: false,
};

/// Every table the harvester writes, in DDL order
pub static ALL_TABLES: &[&TableDef] = &[
    &ASSET,
    &ASSET_COLLABORATION,
    &DATA_FIELD,
    &GLOSSARY,
    &TERM,
    &COLLECTION,
    &PROJECT,
    &TEAM,
    &LOCATION,
    &CERTIFICATION,
    &CORRELATION,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_columns_are_declared_columns() {
        for table in ALL_TABLES {
            for key in table.key_columns {
                assert!(table.has_column(key), "{} lacks key column {}", table.name, key);
            }
        }
    }

    #[test]
    fn column_names_are_unique_per_table() {
        for table in ALL_TABLES {
            let mut seen = HashSet::new();
            for column in table.all_columns() {
                assert!(seen.insert(column.name), "{} repeats {}", table.name, column.name);
            }
        }
    }

    #[test]
    fn every_table_ends_with_sync_time() {
        for table in ALL_TABLES {
            let last = table.all_columns().last().unwrap();
            assert_eq!(last.name, SYNC_TIME_COLUMN);
            assert_eq!(last.ty, ColumnType::Timestamp);
        }
    }
}
