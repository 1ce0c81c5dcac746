//! Type, relationship, and classification names understood by the harvester

/// Element type names
pub mod types {
    pub const REFERENCEABLE: &str = "Referenceable";
    pub const ASSET: &str = "Asset";
    pub const GLOSSARY: &str = "Glossary";
    pub const GLOSSARY_TERM: &str = "GlossaryTerm";
    pub const GLOSSARY_CATEGORY: &str = "GlossaryCategory";
    pub const PROJECT: &str = "Project";
    pub const COLLECTION: &str = "Collection";
    pub const TEAM: &str = "Team";
    pub const LOCATION: &str = "Location";
    pub const SCHEMA_TYPE: &str = "SchemaType";
    pub const SCHEMA_ATTRIBUTE: &str = "SchemaAttribute";
    pub const INFORMAL_TAG: &str = "InformalTag";
    pub const LIKE: &str = "Like";
    pub const RATING: &str = "Rating";
    pub const COMMENT: &str = "Comment";
    pub const CERTIFICATION_TYPE: &str = "CertificationType";
    pub const LICENSE_TYPE: &str = "LicenseType";
    pub const EXTERNAL_ID: &str = "ExternalId";
    pub const SOFTWARE_CAPABILITY: &str = "SoftwareCapability";
    pub const USER_IDENTITY: &str = "UserIdentity";
}

/// Relationship type names (direction is end1 -> end2)
pub mod relationships {
    pub const ASSET_LOCATION: &str = "AssetLocation";
    pub const LICENSE: &str = "License";
    pub const ATTACHED_TAG: &str = "AttachedTag";
    pub const SEMANTIC_ASSIGNMENT: &str = "SemanticAssignment";
    pub const ATTACHED_LIKE: &str = "AttachedLike";
    pub const ATTACHED_RATING: &str = "AttachedRating";
    pub const ATTACHED_COMMENT: &str = "AttachedComment";
    pub const CERTIFICATION: &str = "Certification";
    pub const ASSET_SCHEMA_TYPE: &str = "AssetSchemaType";
    pub const ATTRIBUTE_FOR_SCHEMA: &str = "AttributeForSchema";
    pub const NESTED_SCHEMA_ATTRIBUTE: &str = "NestedSchemaAttribute";
    pub const RELATED_ASSET: &str = "RelatedAsset";
    pub const TERM_ANCHOR: &str = "TermAnchor";
    pub const CATEGORY_ANCHOR: &str = "CategoryAnchor";
    pub const COLLECTION_MEMBERSHIP: &str = "CollectionMembership";
    pub const PROJECT_HIERARCHY: &str = "ProjectHierarchy";
    pub const TEAM_STRUCTURE: &str = "TeamStructure";
    pub const NESTED_LOCATION: &str = "NestedLocation";
    pub const EXTERNAL_ID_LINK: &str = "ExternalIdLink";
    pub const EXTERNAL_ID_SCOPE: &str = "ExternalIdScope";
}

/// Classification names
pub mod classifications {
    pub const OWNERSHIP: &str = "Ownership";
    pub const CONFIDENTIALITY: &str = "Confidentiality";
    pub const CONFIDENCE: &str = "Confidence";
    pub const CRITICALITY: &str = "Criticality";
    pub const ASSET_ZONE_MEMBERSHIP: &str = "AssetZoneMembership";
    pub const DIGITAL_RESOURCE_ORIGIN: &str = "DigitalResourceOrigin";
}
