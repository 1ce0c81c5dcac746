//! Row projection: enriched elements to flat, typed rows

mod mapping;
mod project;
mod row;

pub use mapping::{coerce, PropertyColumn};
pub use project::{
    project_asset, project_asset_collaboration, project_certification, project_collection,
    project_correlation, project_data_field, project_glossary, project_location, project_project,
    project_team, project_term, AssetFacts,
};
pub use row::{frame_list, ColumnValue, RowRecord, LIST_DELIMITER, SYNC_TIME_COLUMN};
