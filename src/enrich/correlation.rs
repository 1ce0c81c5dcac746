//! External-system correlation: which outside identifiers an element carries

use super::Resolvers;
use crate::graph::vocab::{relationships, types};
use crate::graph::{Direction, Element, ElementId, Relationship};
use crate::storage::StorageResult;
use crate::traverse::{first_related, for_each_related};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// One external identifier linked to an element, with its owning system
#[derive(Debug, Clone)]
pub struct CorrelationSummary {
    pub link: Relationship,
    pub external_id: Element,
    /// Software capability scoping the identifier, when recorded
    pub system: Option<Element>,
}

/// Flattened correlation facts for one (element, external system) pair
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRecord {
    pub external_system_guid: ElementId,
    pub external_system_name: Option<String>,
    pub external_identifier: Option<String>,
    pub created_by: Option<String>,
    pub created_by_guid: Option<ElementId>,
    pub updated_by: Option<String>,
    pub updated_by_guid: Option<ElementId>,
    pub last_synchronized: Option<DateTime<Utc>>,
}

impl Resolvers<'_> {
    pub fn correlation_summaries(&self, id: &ElementId) -> StorageResult<Vec<CorrelationSummary>> {
        let mut summaries = Vec::new();
        for view in for_each_related(
            self.store,
            id,
            Some(relationships::EXTERNAL_ID_LINK),
            Direction::Outgoing,
            self.page_size,
        ) {
            let view = view?;
            let system = first_related(
                self.store,
                &view.element.id,
                relationships::EXTERNAL_ID_SCOPE,
                Direction::Incoming,
            )?
            .map(|scope| scope.element);
            summaries.push(CorrelationSummary {
                link: view.relationship,
                external_id: view.element,
                system,
            });
        }
        Ok(summaries)
    }

    /// One record per external system; later identifiers from an already
    /// seen system are ignored, as are identifiers with no system.
    pub fn correlation_properties(
        &self,
        id: &ElementId,
        summaries: &[CorrelationSummary],
    ) -> StorageResult<Vec<CorrelationRecord>> {
        let mut seen: HashSet<&ElementId> = HashSet::new();
        let mut records = Vec::new();

        for summary in summaries {
            let Some(system) = &summary.system else {
                tracing::debug!(element = %id, external_id = %summary.external_id.id, "external id has no scoping system");
                continue;
            };
            if !seen.insert(&system.id) {
                continue;
            }

            let external = &summary.external_id;
            let created_by = external.string_property("externalInstanceCreatedBy");
            let updated_by = external.string_property("externalInstanceLastUpdatedBy");
            records.push(CorrelationRecord {
                external_system_guid: system.id.clone(),
                external_system_name: system.display_name().map(str::to_string),
                external_identifier: external.string_property("identifier").map(str::to_string),
                created_by: created_by.map(str::to_string),
                created_by_guid: self.canonical_identity(created_by)?,
                updated_by: updated_by.map(str::to_string),
                updated_by_guid: self.canonical_identity(updated_by)?,
                last_synchronized: summary
                    .link
                    .properties
                    .get("lastSynchronized")
                    .and_then(|v| v.as_timestamp()),
            });
        }

        Ok(records)
    }

    /// The `UserIdentity` whose `userId` is exactly `user`
    fn canonical_identity(&self, user: Option<&str>) -> StorageResult<Option<ElementId>> {
        let Some(user) = user else {
            return Ok(None);
        };
        let matches = self
            .store
            .find_elements_by_exact_property(types::USER_IDENTITY, "userId", user)?;
        Ok(matches.into_iter().next().map(|identity| identity.id))
    }
}
