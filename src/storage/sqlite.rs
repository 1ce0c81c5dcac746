//! SQLite-backed metadata graph store

use super::traits::{MetadataStore, OpenStore, PageCursor, StorageError, StorageResult};
use crate::graph::{
    Direction, Element, ElementId, RelatedElementView, Relationship, RelationshipId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ELEMENT_COLUMNS: &str = "e.id, e.type_name, e.super_types_json, e.properties_json, \
     e.classifications_json, e.provenance_json, e.version_json";

const RELATIONSHIP_COLUMNS: &str = "r.id, r.type_name, r.end1_id, r.end2_id, r.properties_json, \
     r.effective_from, r.effective_to";

/// Raw element columns as stored
struct ElementRow {
    id: String,
    type_name: String,
    super_types_json: String,
    properties_json: String,
    classifications_json: String,
    provenance_json: String,
    version_json: String,
}

impl ElementRow {
    fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            type_name: row.get(offset + 1)?,
            super_types_json: row.get(offset + 2)?,
            properties_json: row.get(offset + 3)?,
            classifications_json: row.get(offset + 4)?,
            provenance_json: row.get(offset + 5)?,
            version_json: row.get(offset + 6)?,
        })
    }

    fn decode(self) -> StorageResult<Element> {
        Ok(Element {
            id: ElementId::from_string(self.id),
            type_name: self.type_name,
            super_types: serde_json::from_str(&self.super_types_json)?,
            properties: serde_json::from_str(&self.properties_json)?,
            classifications: serde_json::from_str(&self.classifications_json)?,
            provenance: serde_json::from_str(&self.provenance_json)?,
            version_info: serde_json::from_str(&self.version_json)?,
        })
    }
}

/// Raw relationship columns as stored
struct RelationshipRow {
    id: String,
    type_name: String,
    end1: String,
    end2: String,
    properties_json: String,
    effective_from: Option<String>,
    effective_to: Option<String>,
}

impl RelationshipRow {
    fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            type_name: row.get(offset + 1)?,
            end1: row.get(offset + 2)?,
            end2: row.get(offset + 3)?,
            properties_json: row.get(offset + 4)?,
            effective_from: row.get(offset + 5)?,
            effective_to: row.get(offset + 6)?,
        })
    }

    fn decode(self) -> StorageResult<Relationship> {
        Ok(Relationship {
            id: RelationshipId::from_string(self.id),
            type_name: self.type_name,
            end1: ElementId::from_string(self.end1),
            end2: ElementId::from_string(self.end2),
            properties: serde_json::from_str(&self.properties_json)?,
            effective_from: parse_time(self.effective_from)?,
            effective_to: parse_time(self.effective_to)?,
        })
    }
}

fn parse_time(value: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StorageError::DateParse(e.to_string()))
        })
        .transpose()
}

/// SQLite-backed metadata graph
///
/// Elements and relationships live in two tables; every type an element
/// is-a is indexed in `element_types` so subtype queries are a join.
/// Insertion order (`seq`) is the page order, and an upsert keeps an
/// element's original position so paging stays stable across edits.
///
/// Thread-safe via internal mutex on the connection. Authoring methods are
/// inherent to this type; the [`MetadataStore`] trait is read-only.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS elements (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                type_name TEXT NOT NULL,
                super_types_json TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                classifications_json TEXT NOT NULL,
                provenance_json TEXT NOT NULL,
                version_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS element_types (
                element_id TEXT NOT NULL,
                type_name TEXT NOT NULL,
                PRIMARY KEY (element_id, type_name),
                FOREIGN KEY (element_id) REFERENCES elements(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_element_types_type
                ON element_types(type_name, element_id);

            CREATE TABLE IF NOT EXISTS relationships (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                type_name TEXT NOT NULL,
                end1_id TEXT NOT NULL,
                end2_id TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                effective_from TEXT,
                effective_to TEXT,
                FOREIGN KEY (end1_id) REFERENCES elements(id) ON DELETE CASCADE,
                FOREIGN KEY (end2_id) REFERENCES elements(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_relationships_end1
                ON relationships(end1_id, type_name);
            CREATE INDEX IF NOT EXISTS idx_relationships_end2
                ON relationships(end2_id, type_name);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".into()))
    }

    /// Insert or replace an element, keeping its page position if it already exists
    pub fn save_element(&self, element: &Element) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO elements (id, type_name, super_types_json, properties_json,
                                  classifications_json, provenance_json, version_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                type_name = excluded.type_name,
                super_types_json = excluded.super_types_json,
                properties_json = excluded.properties_json,
                classifications_json = excluded.classifications_json,
                provenance_json = excluded.provenance_json,
                version_json = excluded.version_json
            "#,
            params![
                element.id.as_str(),
                element.type_name,
                serde_json::to_string(&element.super_types)?,
                serde_json::to_string(&element.properties)?,
                serde_json::to_string(&element.classifications)?,
                serde_json::to_string(&element.provenance)?,
                serde_json::to_string(&element.version_info)?,
            ],
        )?;

        tx.execute(
            "DELETE FROM element_types WHERE element_id = ?1",
            params![element.id.as_str()],
        )?;
        for type_name in std::iter::once(&element.type_name).chain(element.super_types.iter()) {
            tx.execute(
                "INSERT OR IGNORE INTO element_types (element_id, type_name) VALUES (?1, ?2)",
                params![element.id.as_str(), type_name],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Insert or replace a relationship. Both ends must already exist.
    pub fn save_relationship(&self, relationship: &Relationship) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO relationships (id, type_name, end1_id, end2_id, properties_json,
                                       effective_from, effective_to)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                type_name = excluded.type_name,
                end1_id = excluded.end1_id,
                end2_id = excluded.end2_id,
                properties_json = excluded.properties_json,
                effective_from = excluded.effective_from,
                effective_to = excluded.effective_to
            "#,
            params![
                relationship.id.as_str(),
                relationship.type_name,
                relationship.end1.as_str(),
                relationship.end2.as_str(),
                serde_json::to_string(&relationship.properties)?,
                relationship.effective_from.map(|t| t.to_rfc3339()),
                relationship.effective_to.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Delete an element and every relationship touching it
    pub fn delete_element(&self, id: &ElementId) -> StorageResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM elements WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    pub fn delete_relationship(&self, id: &RelationshipId) -> StorageResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM relationships WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    /// Number of elements of `type_name` (including subtypes)
    pub fn count_of_type(&self, type_name: &str) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM element_types WHERE type_name = ?1",
            params![type_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl MetadataStore for SqliteStore {
    fn elements_by_type(&self, type_name: &str, page: PageCursor) -> StorageResult<Vec<Element>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {ELEMENT_COLUMNS} FROM elements e
             JOIN element_types t ON t.element_id = e.id
             WHERE t.type_name = ?1
             ORDER BY e.seq
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![type_name, page.page_size as i64, page.start as i64],
            |row| ElementRow::read(row, 0),
        )?;

        let mut elements = Vec::new();
        for row in rows {
            elements.push(row?.decode()?);
        }
        Ok(elements)
    }

    fn related_elements(
        &self,
        id: &ElementId,
        direction: Direction,
        relationship_type: Option<&str>,
        page: PageCursor,
    ) -> StorageResult<Vec<RelatedElementView>> {
        let conn = self.conn()?;
        let (end_filter, far_end) = match direction {
            Direction::Outgoing => ("r.end1_id = ?1", "r.end2_id"),
            Direction::Incoming => ("r.end2_id = ?1", "r.end1_id"),
            Direction::Both => (
                "(r.end1_id = ?1 OR r.end2_id = ?1)",
                "CASE WHEN r.end1_id = ?1 THEN r.end2_id ELSE r.end1_id END",
            ),
        };
        let sql = format!(
            "SELECT {RELATIONSHIP_COLUMNS}, {ELEMENT_COLUMNS}
             FROM relationships r
             JOIN elements e ON e.id = {far_end}
             WHERE {end_filter} AND (?2 IS NULL OR r.type_name = ?2)
             ORDER BY r.seq
             LIMIT ?3 OFFSET ?4"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                id.as_str(),
                relationship_type,
                page.page_size as i64,
                page.start as i64
            ],
            |row| Ok((RelationshipRow::read(row, 0)?, ElementRow::read(row, 7)?)),
        )?;

        let mut views = Vec::new();
        for row in rows {
            let (relationship, element) = row?;
            views.push(RelatedElementView {
                relationship: relationship.decode()?,
                element: element.decode()?,
            });
        }
        Ok(views)
    }

    fn element_by_guid(&self, id: &ElementId) -> StorageResult<Option<Element>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {ELEMENT_COLUMNS} FROM elements e WHERE e.id = ?1");
        let row = conn
            .query_row(&sql, params![id.as_str()], |row| ElementRow::read(row, 0))
            .optional()?;
        row.map(ElementRow::decode).transpose()
    }

    fn find_elements_by_exact_property(
        &self,
        type_name: &str,
        property: &str,
        value: &str,
    ) -> StorageResult<Vec<Element>> {
        let conn = self.conn()?;
        let path = format!("$.\"{}\"", property.replace('"', "\\\""));
        let sql = format!(
            "SELECT {ELEMENT_COLUMNS} FROM elements e
             JOIN element_types t ON t.element_id = e.id
             WHERE t.type_name = ?1
               AND json_type(e.properties_json, ?2) = 'text'
               AND json_extract(e.properties_json, ?2) = ?3
             ORDER BY e.seq"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![type_name, path, value], |row| ElementRow::read(row, 0))?;

        let mut elements = Vec::new();
        for row in rows {
            elements.push(row?.decode()?);
        }
        Ok(elements)
    }

    fn relationship_by_guid(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {RELATIONSHIP_COLUMNS} FROM relationships r WHERE r.id = ?1");
        let row = conn
            .query_row(&sql, params![id.as_str()], |row| RelationshipRow::read(row, 0))
            .optional()?;
        row.map(RelationshipRow::decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Classification, PropertyValue};

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn asset(id: &str) -> Element {
        Element::new("DataSet")
            .with_id(id)
            .with_super_types(["Asset", "Referenceable"])
            .with_property("qualifiedName", format!("dataset::{id}"))
    }

    #[test]
    fn test_save_and_load_element() {
        let store = create_test_store();
        let element = asset("a1")
            .with_classification(Classification::new("Criticality").with_property("levelIdentifier", 4_i64));
        store.save_element(&element).unwrap();

        let loaded = store.element_by_guid(&element.id).unwrap().unwrap();
        assert_eq!(loaded, element);
        assert!(store.element_by_guid(&ElementId::from_string("missing")).unwrap().is_none());
    }

    #[test]
    fn test_elements_by_type_includes_subtypes() {
        let store = create_test_store();
        store.save_element(&asset("a1")).unwrap();
        store.save_element(&Element::new("Glossary").with_id("g1")).unwrap();

        let assets = store.elements_by_type("Asset", PageCursor::first(10)).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id.as_str(), "a1");

        let referenceables = store.elements_by_type("Referenceable", PageCursor::first(10)).unwrap();
        assert_eq!(referenceables.len(), 1);
        assert_eq!(store.count_of_type("DataSet").unwrap(), 1);
    }

    #[test]
    fn test_paging_is_ordered_and_ends_with_empty_page() {
        let store = create_test_store();
        for i in 0..5 {
            store.save_element(&asset(&format!("a{i}"))).unwrap();
        }

        let first = store.elements_by_type("Asset", PageCursor::first(2)).unwrap();
        let second = store.elements_by_type("Asset", PageCursor::first(2).next()).unwrap();
        let third = store.elements_by_type("Asset", PageCursor::first(2).next().next()).unwrap();
        let fourth = store
            .elements_by_type("Asset", PageCursor { start: 6, page_size: 2 })
            .unwrap();

        let ids: Vec<_> = first.iter().chain(&second).chain(&third).map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["a0", "a1", "a2", "a3", "a4"]);
        assert!(fourth.is_empty());
    }

    #[test]
    fn test_upsert_keeps_page_position() {
        let store = create_test_store();
        store.save_element(&asset("a0")).unwrap();
        store.save_element(&asset("a1")).unwrap();
        store
            .save_element(&asset("a0").with_property("description", "edited"))
            .unwrap();

        let page = store.elements_by_type("Asset", PageCursor::first(10)).unwrap();
        assert_eq!(page[0].id.as_str(), "a0");
        assert_eq!(page[0].string_property("description"), Some("edited"));
    }

    #[test]
    fn test_related_elements_by_direction_and_type() {
        let store = create_test_store();
        let parent = Element::new("Team").with_id("parent");
        let child = Element::new("Team").with_id("child");
        let tag = Element::new("InformalTag").with_id("tag");
        for e in [&parent, &child, &tag] {
            store.save_element(e).unwrap();
        }
        store
            .save_relationship(&Relationship::new("TeamStructure", parent.id.clone(), child.id.clone()))
            .unwrap();
        store
            .save_relationship(&Relationship::new("AttachedTag", child.id.clone(), tag.id.clone()))
            .unwrap();

        let up = store
            .related_elements(&child.id, Direction::Incoming, Some("TeamStructure"), PageCursor::first(10))
            .unwrap();
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].element.id, parent.id);

        let down = store
            .related_elements(&child.id, Direction::Outgoing, None, PageCursor::first(10))
            .unwrap();
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].element.id, tag.id);

        let all = store
            .related_elements(&child.id, Direction::Both, None, PageCursor::first(10))
            .unwrap();
        let far: Vec<_> = all.iter().map(|v| v.element.id.as_str()).collect();
        assert_eq!(far, vec!["parent", "tag"]);
    }

    #[test]
    fn test_find_elements_by_exact_property() {
        let store = create_test_store();
        store
            .save_element(&Element::new("UserIdentity").with_id("u1").with_property("userId", "erin"))
            .unwrap();
        store
            .save_element(&Element::new("UserIdentity").with_id("u2").with_property("userId", "erin2"))
            .unwrap();
        store
            .save_element(&Element::new("UserIdentity").with_id("u3").with_property("userId", PropertyValue::Int(7)))
            .unwrap();

        let found = store
            .find_elements_by_exact_property("UserIdentity", "userId", "erin")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "u1");

        let numeric = store
            .find_elements_by_exact_property("UserIdentity", "userId", "7")
            .unwrap();
        assert!(numeric.is_empty());
    }

    #[test]
    fn test_relationship_by_guid_round_trips_window() {
        let store = create_test_store();
        let a = asset("a1");
        let cert = Element::new("CertificationType").with_id("cert");
        store.save_element(&a).unwrap();
        store.save_element(&cert).unwrap();

        let from = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let rel = Relationship::new("Certification", a.id.clone(), cert.id.clone())
            .with_property("certifiedBy", "auditor")
            .with_effective_window(Some(from), None);
        store.save_relationship(&rel).unwrap();

        let loaded = store.relationship_by_guid(&rel.id).unwrap().unwrap();
        assert_eq!(loaded, rel);
    }

    #[test]
    fn test_delete_element_cascades_relationships() {
        let store = create_test_store();
        let a = asset("a1");
        let tag = Element::new("InformalTag").with_id("t1");
        store.save_element(&a).unwrap();
        store.save_element(&tag).unwrap();
        let rel = Relationship::new("AttachedTag", a.id.clone(), tag.id.clone());
        store.save_relationship(&rel).unwrap();

        assert!(store.delete_element(&tag.id).unwrap());
        assert!(store.relationship_by_guid(&rel.id).unwrap().is_none());
        assert_eq!(store.count_of_type("InformalTag").unwrap(), 0);
    }
}
