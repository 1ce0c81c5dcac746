//! Typed, directed relationships between elements

use super::element::{Element, ElementId, Properties, PropertyValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a relationship
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction for relationship traversal, relative to the starting element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow end1 -> end2 (towards descendants)
    #[default]
    Outgoing,
    /// Follow end2 -> end1 (towards ancestors)
    Incoming,
    /// Follow relationships where the element is at either end
    Both,
}

/// A directed edge `end1 -> end2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    /// Relationship type (e.g. "AttachedTag", "TeamStructure")
    pub type_name: String,
    pub end1: ElementId,
    pub end2: ElementId,
    #[serde(default)]
    pub properties: Properties,
    /// Start of the effective window, if bounded
    pub effective_from: Option<DateTime<Utc>>,
    /// End of the effective window, if bounded
    pub effective_to: Option<DateTime<Utc>>,
}

impl Relationship {
    pub fn new(type_name: impl Into<String>, end1: ElementId, end2: ElementId) -> Self {
        Self {
            id: RelationshipId::new(),
            type_name: type_name.into(),
            end1,
            end2,
            properties: Properties::new(),
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = RelationshipId::from_string(id);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_effective_window(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// The end opposite to `from`. Self-loops return `from`.
    pub fn other_end(&self, from: &ElementId) -> &ElementId {
        if &self.end1 == from {
            &self.end2
        } else {
            &self.end1
        }
    }
}

/// A relationship paired with the element at its far end
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedElementView {
    pub relationship: Relationship,
    pub element: Element,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_end_picks_opposite_element() {
        let a = ElementId::from_string("a");
        let b = ElementId::from_string("b");
        let rel = Relationship::new("TeamStructure", a.clone(), b.clone());
        assert_eq!(rel.other_end(&a), &b);
        assert_eq!(rel.other_end(&b), &a);
    }

    #[test]
    fn relationship_id_serializes_as_string() {
        let id = RelationshipId::from_string("rel-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"rel-1\"");
    }
}
