//! Element representation in the metadata graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for an element
///
/// Serializes as a plain string (a GUID minted by the repository).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new random ElementId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an ElementId from an existing GUID string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Typed property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// RFC 3339 strings and epoch milliseconds are both accepted
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            Self::Int(millis) => DateTime::from_timestamp_millis(*millis),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Properties collection
///
/// Ordered so that serialized property bags are stable across saves.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A named property bag attached to an element (ownership, confidentiality, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Classification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Whether an element was authored locally or copied in from another source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceCategory {
    /// Home-grown in this repository's own metadata collection
    #[default]
    Local,
    /// Sourced from an external metadata collection
    External,
}

impl ProvenanceCategory {
    /// Column value used in the relational history tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL_COHORT",
            Self::External => "EXTERNAL_SOURCE",
        }
    }
}

/// Where an element came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub metadata_collection_id: Option<String>,
    pub metadata_collection_name: Option<String>,
    #[serde(default)]
    pub category: ProvenanceCategory,
}

/// Authorship and versioning metadata maintained by the repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub maintained_by: Vec<String>,
    #[serde(default)]
    pub version: i64,
}

/// A node in the metadata graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Concrete type name (e.g. "DataSet")
    pub type_name: String,
    /// Ancestor type names, nearest first (e.g. ["Asset", "Referenceable"])
    #[serde(default)]
    pub super_types: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub classifications: Vec<Classification>,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default)]
    pub version_info: VersionInfo,
}

impl Element {
    /// Create a new element of the given type with a fresh id
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            type_name: type_name.into(),
            super_types: Vec::new(),
            properties: Properties::new(),
            classifications: Vec::new(),
            provenance: Provenance::default(),
            version_info: VersionInfo {
                created_at: Some(Utc::now()),
                version: 1,
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = ElementId::from_string(id);
        self
    }

    pub fn with_super_types<I, S>(mut self, super_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.super_types = super_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classifications.push(classification);
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// True if this element is of `type_name` or one of its subtypes
    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name == type_name || self.super_types.iter().any(|t| t == type_name)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    /// Human-facing name: `displayName`, falling back to `name`
    pub fn display_name(&self) -> Option<&str> {
        self.string_property("displayName")
            .or_else(|| self.string_property("name"))
    }

    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_a_checks_super_types() {
        let element = Element::new("DataSet").with_super_types(["Asset", "Referenceable"]);
        assert!(element.is_a("DataSet"));
        assert!(element.is_a("Asset"));
        assert!(element.is_a("Referenceable"));
        assert!(!element.is_a("Glossary"));
    }

    #[test]
    fn display_name_falls_back_to_name() {
        let named = Element::new("Team").with_property("name", "Platform");
        assert_eq!(named.display_name(), Some("Platform"));

        let both = Element::new("Team")
            .with_property("name", "Platform")
            .with_property("displayName", "Platform Team");
        assert_eq!(both.display_name(), Some("Platform Team"));

        let wrong_type = Element::new("Team").with_property("displayName", 7_i64);
        assert_eq!(wrong_type.display_name(), None);
    }

    #[test]
    fn classification_lookup_by_name() {
        let element = Element::new("Asset")
            .with_classification(Classification::new("Confidentiality").with_property("levelIdentifier", 3_i64));
        let found = element.classification("Confidentiality").unwrap();
        assert_eq!(found.properties.get("levelIdentifier"), Some(&PropertyValue::Int(3)));
        assert!(element.classification("Ownership").is_none());
    }
}
