//! Fixture repository
//!
//! Assets
//! - `ds-sales` (DataSet): tags, location, license, semantic term, a
//!   three-comment thread, a rating, a like, a certification, a nested
//!   schema, and an external identifier from the CRM
//! - `ds-empty` (DataFile): nothing attached
//!
//! Schema of `ds-sales`: `f-id` and `f-address -> {f-street, f-city}`
//!
//! Glossary `g-finance` anchoring `term-revenue` and `term-cost`.
//! Collections `coll-fav -> {ds-sales, coll-sub}` and `coll-sub -> {ds-empty, term-cost}`.
//! Projects `prj-root -> prj-child`. Teams `team-acme -> team-platform -> team-storage`.
//! Locations `loc-eu -> loc-ams`.

use chrono::{TimeZone, Utc};
use metasync::{
    AuditLog, Classification, Element, MemoryAuditLog, MetadataStore, OpenSink, OpenStore,
    Relationship, RelationalSink, SqliteSink, SqliteStore, SyncConfig, SyncController,
};
use std::sync::Arc;

const ASSET_SUPERS: [&str; 2] = ["Asset", "Referenceable"];

fn element(type_name: &str, id: &str, name: &str) -> Element {
    Element::new(type_name)
        .with_id(id)
        .with_super_types(["Referenceable"])
        .with_property("qualifiedName", format!("{type_name}::{id}"))
        .with_property("name", name)
}

fn link(store: &SqliteStore, type_name: &str, from: &str, to: &str) {
    store
        .save_relationship(&Relationship::new(type_name, from.into(), to.into()))
        .unwrap();
}

pub fn repository() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    let save = |e: Element| store.save_element(&e).unwrap();

    save(
        element("DataSet", "ds-sales", "Weekly sales")
            .with_super_types(ASSET_SUPERS)
            .with_property("description", "Sales aggregated per week")
            .with_classification(Classification::new("Confidentiality").with_property("levelIdentifier", 2_i64))
            .with_classification(
                Classification::new("Ownership")
                    .with_property("owner", "erin")
                    .with_property("ownerTypeName", "UserIdentity"),
            ),
    );
    save(element("DataFile", "ds-empty", "Scratch file").with_super_types(ASSET_SUPERS));

    // asset neighbourhood
    save(element("InformalTag", "tag-sales", "sales").with_property("tagName", "sales"));
    save(element("InformalTag", "tag-weekly", "weekly").with_property("tagName", "weekly"));
    link(&store, "AttachedTag", "ds-sales", "tag-sales");
    link(&store, "AttachedTag", "ds-sales", "tag-weekly");

    save(element("Location", "loc-eu", "Europe"));
    save(element("Location", "loc-ams", "Amsterdam").with_property("coordinates", "52.37,4.90"));
    link(&store, "NestedLocation", "loc-eu", "loc-ams");
    link(&store, "AssetLocation", "ds-sales", "loc-ams");

    save(element("LicenseType", "lic-cc", "CC-BY-4.0"));
    link(&store, "License", "ds-sales", "lic-cc");

    save(element("Comment", "cmt-1", "first"));
    save(element("Comment", "cmt-1a", "reply"));
    save(element("Comment", "cmt-1b", "reply to reply"));
    link(&store, "AttachedComment", "ds-sales", "cmt-1");
    link(&store, "AttachedComment", "cmt-1", "cmt-1a");
    link(&store, "AttachedComment", "cmt-1a", "cmt-1b");

    save(Element::new("Rating").with_id("rating-1").with_property("stars", "FourStars"));
    link(&store, "AttachedRating", "ds-sales", "rating-1");
    save(Element::new("Like").with_id("like-1"));
    link(&store, "AttachedLike", "ds-sales", "like-1");

    save(element("CertificationType", "cert-gdpr", "GDPR"));
    store
        .save_relationship(
            &Relationship::new("Certification", "ds-sales".into(), "cert-gdpr".into())
                .with_id("cert-1")
                .with_property("certifiedBy", "auditor")
                .with_effective_window(Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()), None),
        )
        .unwrap();

    // schema tree
    save(element("SchemaType", "schema-sales", "sales schema"));
    link(&store, "AssetSchemaType", "ds-sales", "schema-sales");
    for (id, position) in [("f-id", 0_i64), ("f-address", 1), ("f-street", 0), ("f-city", 1)] {
        save(
            element("SchemaAttribute", id, id)
                .with_property("position", position)
                .with_property("isNullable", id != "f-id"),
        );
    }
    link(&store, "AttributeForSchema", "schema-sales", "f-id");
    link(&store, "AttributeForSchema", "schema-sales", "f-address");
    link(&store, "NestedSchemaAttribute", "f-address", "f-street");
    link(&store, "NestedSchemaAttribute", "f-address", "f-city");

    // glossary
    save(element("Glossary", "g-finance", "Finance").with_property("language", "en"));
    save(element("GlossaryTerm", "term-revenue", "Revenue").with_property("summary", "Money in"));
    save(element("GlossaryTerm", "term-cost", "Cost"));
    save(element("GlossaryCategory", "cat-metrics", "Metrics"));
    link(&store, "TermAnchor", "g-finance", "term-revenue");
    link(&store, "TermAnchor", "g-finance", "term-cost");
    link(&store, "CategoryAnchor", "g-finance", "cat-metrics");
    link(&store, "SemanticAssignment", "ds-sales", "term-revenue");
    link(&store, "SemanticAssignment", "f-id", "term-revenue");

    // collections
    save(element("Collection", "coll-fav", "Favourites"));
    save(element("Collection", "coll-sub", "Drafts"));
    link(&store, "CollectionMembership", "coll-fav", "ds-sales");
    link(&store, "CollectionMembership", "coll-fav", "coll-sub");
    link(&store, "CollectionMembership", "coll-sub", "ds-empty");
    link(&store, "CollectionMembership", "coll-sub", "term-cost");

    // projects and teams
    save(element("Project", "prj-root", "Modernisation").with_property("projectStatus", "ACTIVE"));
    save(element("Project", "prj-child", "Data lake"));
    link(&store, "ProjectHierarchy", "prj-root", "prj-child");
    for (id, name) in [("team-acme", "Acme"), ("team-platform", "Platform"), ("team-storage", "Storage")] {
        save(element("Team", id, name));
    }
    link(&store, "TeamStructure", "team-acme", "team-platform");
    link(&store, "TeamStructure", "team-platform", "team-storage");

    // correlation
    save(element("SoftwareCapability", "crm", "CRM"));
    save(element("UserIdentity", "uid-alice", "alice").with_property("userId", "alice"));
    save(
        Element::new("ExternalId")
            .with_id("ext-1")
            .with_property("identifier", "CRM-0042")
            .with_property("externalInstanceCreatedBy", "alice"),
    );
    store
        .save_relationship(
            &Relationship::new("ExternalIdLink", "ds-sales".into(), "ext-1".into())
                .with_property("lastSynchronized", "2024-02-01T08:00:00Z"),
        )
        .unwrap();
    link(&store, "ExternalIdScope", "crm", "ext-1");

    store
}

/// `n` teams, each the parent of the next
pub fn team_chain(n: usize) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for i in 0..n {
        store.save_element(&element("Team", &format!("t{i}"), &format!("Team {i}"))).unwrap();
        if i > 0 {
            link(&store, "TeamStructure", &format!("t{}", i - 1), &format!("t{i}"));
        }
    }
    store
}

/// Store, sink, and audit log wired to one controller
pub struct Harness {
    pub store: Arc<SqliteStore>,
    pub sink: Arc<SqliteSink>,
    pub audit: Arc<MemoryAuditLog>,
    pub controller: SyncController,
}

impl Harness {
    pub fn new(store: SqliteStore, config: SyncConfig) -> Self {
        let store = Arc::new(store);
        let sink = Arc::new(SqliteSink::open_in_memory().unwrap());
        Self::with_parts(store.clone(), store, sink, config)
    }

    /// `reader` is what the controller sees; `store` stays reachable for edits
    pub fn with_parts(
        store: Arc<SqliteStore>,
        reader: Arc<dyn MetadataStore>,
        sink: Arc<SqliteSink>,
        config: SyncConfig,
    ) -> Self {
        let audit = Arc::new(MemoryAuditLog::new());
        let controller = SyncController::new(
            reader,
            sink.clone() as Arc<dyn RelationalSink>,
            audit.clone() as Arc<dyn AuditLog>,
            config,
        )
        .unwrap();
        Self {
            store,
            sink,
            audit,
            controller,
        }
    }
}
