//! Parent lookups along hierarchy relationships

use super::Resolvers;
use crate::graph::vocab::relationships;
use crate::graph::{Direction, Element, ElementId};
use crate::storage::StorageResult;
use crate::traverse::first_related;
use std::collections::HashSet;

impl Resolvers<'_> {
    /// The element one hop up `relationship` (parents are at end1)
    pub fn hierarchy_parent(&self, id: &ElementId, relationship: &str) -> StorageResult<Option<Element>> {
        Ok(first_related(self.store, id, relationship, Direction::Incoming)?.map(|view| view.element))
    }

    /// Name of the top-most team above `team`.
    ///
    /// The team's own name counts when it has no parent. A cycle or the
    /// depth cap ends the climb at the last team reached.
    pub fn organization_name(&self, team: &Element) -> StorageResult<Option<String>> {
        let mut name = team.display_name().map(str::to_string);
        let mut visited: HashSet<ElementId> = HashSet::new();
        visited.insert(team.id.clone());
        let mut current = team.id.clone();

        for _ in 0..self.max_depth {
            let Some(parent) = self.hierarchy_parent(&current, relationships::TEAM_STRUCTURE)? else {
                break;
            };
            if !visited.insert(parent.id.clone()) {
                tracing::debug!(team = %team.id, parent = %parent.id, "team hierarchy cycle");
                break;
            }
            if let Some(parent_name) = parent.display_name() {
                name = Some(parent_name.to_string());
            }
            current = parent.id;
        }

        Ok(name)
    }
}
