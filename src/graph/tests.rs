//! Serialization tests with repository-shaped fixtures

use serde_json::{json, Value};

/// Fixture: an externally sourced asset as the repository exports it
fn element_fixture() -> Value {
    json!({
        "id": "asset:customers",
        "type_name": "DataSet",
        "super_types": ["Asset", "Referenceable"],
        "properties": {
            "qualifiedName": "dataset::customers",
            "displayName": "Customers",
            "position": 3
        },
        "classifications": [
            { "name": "Confidentiality", "properties": { "levelIdentifier": 2 } }
        ],
        "provenance": {
            "metadata_collection_id": "mc-42",
            "metadata_collection_name": "crm-catalog",
            "category": "external"
        },
        "version_info": {
            "created_by": "erin",
            "created_at": "2025-11-29T08:00:00Z",
            "maintained_by": ["erin", "gary"],
            "version": 4
        }
    })
}

/// Fixture: a relationship with a bounded effective window
fn relationship_fixture() -> Value {
    json!({
        "id": "rel:cert-1",
        "type_name": "Certification",
        "end1": "asset:customers",
        "end2": "cert:gdpr",
        "properties": { "certifiedBy": "auditor" },
        "effective_from": "2025-01-01T00:00:00Z",
        "effective_to": "2026-01-01T00:00:00Z"
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{Element, ElementId, PropertyValue, ProvenanceCategory, Relationship};

    #[test]
    fn element_id_serializes_as_string() {
        let id = ElementId::from_string("asset:customers");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"asset:customers\"");
    }

    #[test]
    fn element_deserializes_from_fixture() {
        let element: Element = serde_json::from_value(element_fixture()).unwrap();
        assert_eq!(element.id.as_str(), "asset:customers");
        assert!(element.is_a("Asset"));
        assert_eq!(element.provenance.category, ProvenanceCategory::External);
        assert_eq!(element.version_info.maintained_by, vec!["erin", "gary"]);
        assert_eq!(element.version_info.version, 4);
        assert_eq!(element.property("position"), Some(&PropertyValue::Int(3)));
    }

    #[test]
    fn element_round_trips_through_json() {
        let element: Element = serde_json::from_value(element_fixture()).unwrap();
        let json = serde_json::to_string(&element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(element, back);
    }

    #[test]
    fn element_defaults_missing_sections() {
        let element: Element = serde_json::from_value(json!({
            "id": "team:1",
            "type_name": "Team"
        }))
        .unwrap();
        assert!(element.properties.is_empty());
        assert!(element.classifications.is_empty());
        assert_eq!(element.provenance.category, ProvenanceCategory::Local);
        assert_eq!(element.version_info.version, 0);
    }

    #[test]
    fn relationship_deserializes_from_fixture() {
        let rel: Relationship = serde_json::from_value(relationship_fixture()).unwrap();
        assert_eq!(rel.type_name, "Certification");
        assert_eq!(rel.end2.as_str(), "cert:gdpr");
        assert!(rel.effective_from.unwrap() < rel.effective_to.unwrap());
    }
}
