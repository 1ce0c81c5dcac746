//! One pass over the graph inside an open sink transaction
//!
//! Enrichment failures are audited and the affected columns left null.
//! Sink failures propagate and end the run.

use super::error::{SyncError, SyncResult};
use super::registry::{ElementKind, TypeRegistry};
use super::report::RunReport;
use crate::audit::{AuditEntry, AuditLog};
use crate::config::{SyncConfig, TypeFailurePolicy};
use crate::enrich::Resolvers;
use crate::gate::{self, Decision};
use crate::graph::vocab::relationships;
use crate::graph::{Element, ElementId};
use crate::projection::{self, AssetFacts, ColumnValue, RowRecord};
use crate::sink::schema::{self, TableDef};
use crate::sink::RelationalSink;
use crate::storage::{MetadataStore, StorageError};
use crate::traverse::{descend_to_leaves, for_each_of_type, Descent, DescentSpec};

const SCHEMA_CHILDREN: &[&str] = &[
    relationships::ATTRIBUTE_FOR_SCHEMA,
    relationships::NESTED_SCHEMA_ATTRIBUTE,
];

const COLLECTION_CHILDREN: &[&str] = &[relationships::COLLECTION_MEMBERSHIP];

pub(crate) struct Harvest<'a> {
    pub store: &'a dyn MetadataStore,
    pub sink: &'a dyn RelationalSink,
    pub audit: &'a dyn AuditLog,
    pub config: &'a SyncConfig,
    pub registry: &'a TypeRegistry,
    pub report: &'a mut RunReport,
}

impl<'a> Harvest<'a> {
    fn resolvers(&self) -> Resolvers<'a> {
        Resolvers::new(self.store, self.config.page_size, self.config.max_depth)
    }

    fn descent_spec<'s>(&self, children: &'s [&'s str]) -> DescentSpec<'s> {
        DescentSpec {
            child_relationships: children,
            page_size: self.config.page_size,
            max_depth: self.config.max_depth,
        }
    }

    pub fn run(&mut self) -> SyncResult<()> {
        let config = self.config;
        for type_name in &config.element_types {
            let span = tracing::info_span!("sync_type", type_name = %type_name);
            let _enter = span.enter();
            self.sync_type(type_name)?;
        }
        Ok(())
    }

    fn sync_type(&mut self, type_name: &str) -> SyncResult<()> {
        let fallback = self.registry.kind_of(type_name);
        let mut visited = 0usize;

        for item in for_each_of_type(self.store, type_name, self.config.page_size) {
            let element = match item {
                Ok(element) => element,
                Err(source) => match self.config.type_failure {
                    TypeFailurePolicy::Abort => {
                        return Err(SyncError::Traversal {
                            type_name: type_name.to_string(),
                            source,
                        })
                    }
                    TypeFailurePolicy::Skip => {
                        self.absorb("traverse", "elements_by_type", &source);
                        self.report.skipped_types.push(type_name.to_string());
                        break;
                    }
                },
            };

            visited += 1;
            self.report.elements_visited += 1;
            match self.registry.classify(&element).or(fallback) {
                Some(kind) => self.sync_element(kind, &element)?,
                None => tracing::debug!(element = %element.id, type_name = %element.type_name, "no projection for type"),
            }
        }

        tracing::info!(visited, "type synchronized");
        Ok(())
    }

    fn sync_element(&mut self, kind: ElementKind, element: &Element) -> SyncResult<()> {
        match kind {
            ElementKind::Asset => self.sync_asset(element)?,
            ElementKind::Glossary => {
                let counters = self.enrich("collaboration_counters", |r| r.collaboration_counters(&element.id));
                self.upsert(&schema::GLOSSARY, projection::project_glossary(element, counters.as_ref()))?;
            }
            ElementKind::GlossaryTerm => {
                let glossary = self
                    .enrich("glossary", |r| r.hierarchy_parent(&element.id, relationships::TERM_ANCHOR))
                    .flatten();
                let tags = self.enrich("associated_tags", |r| r.associated_tags(&element.id));
                self.upsert(
                    &schema::TERM,
                    projection::project_term(element, glossary.as_ref(), tags.as_deref()),
                )?;
            }
            ElementKind::Collection => self.sync_collection(element)?,
            ElementKind::Project => {
                let parent = self
                    .enrich("hierarchy_parent", |r| r.hierarchy_parent(&element.id, relationships::PROJECT_HIERARCHY))
                    .flatten();
                self.upsert(&schema::PROJECT, projection::project_project(element, parent.as_ref()))?;
            }
            ElementKind::Team => {
                let parent = self
                    .enrich("hierarchy_parent", |r| r.hierarchy_parent(&element.id, relationships::TEAM_STRUCTURE))
                    .flatten();
                let organization = self.enrich("organization_name", |r| r.organization_name(element)).flatten();
                self.upsert(
                    &schema::TEAM,
                    projection::project_team(element, parent.as_ref(), organization.as_deref()),
                )?;
            }
            ElementKind::Location => {
                let parent = self
                    .enrich("hierarchy_parent", |r| r.hierarchy_parent(&element.id, relationships::NESTED_LOCATION))
                    .flatten();
                self.upsert(&schema::LOCATION, projection::project_location(element, parent.as_ref()))?;
            }
        }
        self.sync_correlation(&element.id)
    }

    fn sync_asset(&mut self, asset: &Element) -> SyncResult<()> {
        let id = &asset.id;
        let facts = AssetFacts {
            license: self.enrich("associated_license", |r| r.associated_license(id)).flatten(),
            location: self.enrich("associated_location", |r| r.associated_location(id)).flatten(),
            semantic_term: self
                .enrich("associated_semantic_term", |r| r.associated_semantic_term(id))
                .flatten(),
            tags: self.enrich("associated_tags", |r| r.associated_tags(id)),
        };
        self.upsert(&schema::ASSET, projection::project_asset(asset, &facts))?;

        let Some(counters) = self.enrich("collaboration_counters", |r| r.collaboration_counters(id)) else {
            return Ok(());
        };
        self.upsert(
            &schema::ASSET_COLLABORATION,
            projection::project_asset_collaboration(id, &counters),
        )?;

        for certification in &counters.certifications {
            let relationship = self
                .enrich("certification", |r| r.certification(certification))
                .flatten();
            if let Some(relationship) = relationship {
                self.upsert(
                    &schema::CERTIFICATION,
                    projection::project_certification(id, certification, &relationship),
                )?;
            }
        }

        if let Some(schema_type) = &counters.schema_type {
            self.sync_data_fields(id, schema_type)?;
        }
        Ok(())
    }

    fn sync_data_fields(&mut self, asset: &ElementId, schema_type: &ElementId) -> SyncResult<()> {
        let Some(root) = self.enrich("schema_type", |r| r.store().element_by_guid(schema_type)).flatten() else {
            return Ok(());
        };
        let descent = descend_to_leaves(self.store, &root, &self.descent_spec(SCHEMA_CHILDREN));
        self.absorb_descent("schema_descent", &descent);

        for leaf in &descent.leaves {
            let term = self
                .enrich("associated_semantic_term", |r| r.associated_semantic_term(&leaf.element.id))
                .flatten();
            let tags = self.enrich("associated_tags", |r| r.associated_tags(&leaf.element.id));
            self.upsert(
                &schema::DATA_FIELD,
                projection::project_data_field(asset, leaf, term.as_ref(), tags.as_deref()),
            )?;
        }
        Ok(())
    }

    fn sync_collection(&mut self, collection: &Element) -> SyncResult<()> {
        let direct = self
            .enrich("collaboration_counters", |r| r.collaboration_counters(&collection.id))
            .map(|counters| counters.members);
        let descent = descend_to_leaves(self.store, collection, &self.descent_spec(COLLECTION_CHILDREN));
        self.absorb_descent("collection_descent", &descent);
        let root_failed = descent.failures.iter().any(|f| f.element == collection.id);
        let leaves = (!root_failed).then_some(descent.leaves.as_slice());

        self.upsert(
            &schema::COLLECTION,
            projection::project_collection(collection, direct, leaves),
        )
    }

    fn sync_correlation(&mut self, element: &ElementId) -> SyncResult<()> {
        let records = self.enrich("correlation", |r| {
            let summaries = r.correlation_summaries(element)?;
            r.correlation_properties(element, &summaries)
        });
        for record in records.unwrap_or_default() {
            self.upsert(&schema::CORRELATION, projection::project_correlation(element, &record))?;
        }
        Ok(())
    }

    /// Run a resolver; a failure is audited and becomes `None`
    fn enrich<T, F>(&mut self, operation: &'static str, resolve: F) -> Option<T>
    where
        F: FnOnce(&Resolvers<'a>) -> Result<T, StorageError>,
    {
        let resolvers = self.resolvers();
        match resolve(&resolvers) {
            Ok(value) => Some(value),
            Err(err) => {
                self.absorb("enrich", operation, &err);
                None
            }
        }
    }

    fn absorb(&mut self, component: &str, operation: &str, err: &StorageError) {
        self.report.absorbed_failures += 1;
        self.audit
            .record(AuditEntry::new(component, operation, err.kind(), err.to_string()));
    }

    fn absorb_descent(&mut self, operation: &str, descent: &Descent) {
        for failure in &descent.failures {
            let message = format!("{}: {}", failure.element, failure.error);
            self.report.absorbed_failures += 1;
            self.audit
                .record(AuditEntry::new("traverse", operation, failure.error.kind(), message));
        }
        for node in &descent.truncated {
            tracing::warn!(element = %node, max_depth = self.config.max_depth, "structural descent truncated");
        }
    }

    /// Append `row` unless it matches the latest stored row for its key
    fn upsert(&mut self, table: &'static TableDef, row: RowRecord) -> SyncResult<()> {
        let key: Vec<(&'static str, ColumnValue)> = table
            .key_columns
            .iter()
            .map(|column| (*column, row.get(column).cloned().unwrap_or(ColumnValue::Null)))
            .collect();
        let key_text = key
            .iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join("/");

        let latest = self
            .sink
            .latest_row(table, &key)
            .map_err(|source| SyncError::Sink {
                operation: "latest_row",
                table: table.name,
                key: key_text.clone(),
                source,
            })?;

        match gate::decide(latest.as_ref(), Some(&row)) {
            Decision::Insert(reason) => {
                self.sink
                    .insert_row(table, &row)
                    .map_err(|source| SyncError::Sink {
                        operation: "insert_row",
                        table: table.name,
                        key: key_text.clone(),
                        source,
                    })?;
                tracing::debug!(table = table.name, key = %key_text, ?reason, "row inserted");
                self.report.record_insert(table.name);
            }
            Decision::Skip => self.report.record_skip(table.name),
        }
        Ok(())
    }
}
