//! Metadata graph data model

mod element;
mod relationship;
pub mod vocab;

#[cfg(test)]
mod tests;

pub use element::{
    Classification, Element, ElementId, Properties, PropertyValue, Provenance, ProvenanceCategory,
    VersionInfo,
};
pub use relationship::{Direction, RelatedElementView, Relationship, RelationshipId};
