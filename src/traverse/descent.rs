//! Depth-first structural descent to leaf nodes
//!
//! Schema trees and nested collections are walked with an explicit stack,
//! a visited set, and a depth cap, so a malformed (cyclic or very deep)
//! graph cannot loop or exhaust the call stack.

use super::pages::for_each_related;
use crate::graph::{Direction, Element, ElementId};
use crate::storage::{MetadataStore, StorageError, StorageResult};
use std::collections::HashSet;

/// Which relationships lead from a node to its structural children
#[derive(Debug, Clone, Copy)]
pub struct DescentSpec<'s> {
    pub child_relationships: &'s [&'s str],
    pub page_size: usize,
    pub max_depth: usize,
}

/// A node with no structural children
#[derive(Debug, Clone)]
pub struct Leaf {
    pub element: Element,
    /// Immediate structural parent
    pub parent: ElementId,
    /// Distance from the root (direct children are at depth 1)
    pub depth: usize,
}

/// A node whose children could not be listed; it is neither projected nor expanded
#[derive(Debug)]
pub struct DescentFailure {
    pub element: ElementId,
    pub error: StorageError,
}

/// Everything a descent found
#[derive(Debug, Default)]
pub struct Descent {
    pub leaves: Vec<Leaf>,
    pub failures: Vec<DescentFailure>,
    /// Nodes at the depth cap that still had children
    pub truncated: Vec<ElementId>,
    /// Nodes reached a second time (shared children or cycles)
    pub revisited: usize,
}

fn children(
    store: &dyn MetadataStore,
    node: &ElementId,
    spec: &DescentSpec<'_>,
) -> StorageResult<Vec<Element>> {
    let mut found = Vec::new();
    for relationship in spec.child_relationships {
        for view in for_each_related(store, node, Some(relationship), Direction::Outgoing, spec.page_size) {
            found.push(view?.element);
        }
    }
    Ok(found)
}

/// Walk from `root` to every leaf. The root itself is never a leaf.
///
/// Leaves are returned in depth-first, page order.
pub fn descend_to_leaves(store: &dyn MetadataStore, root: &Element, spec: &DescentSpec<'_>) -> Descent {
    let mut descent = Descent::default();
    let mut visited: HashSet<ElementId> = HashSet::new();
    visited.insert(root.id.clone());

    let root_children = match children(store, &root.id, spec) {
        Ok(children) => children,
        Err(error) => {
            descent.failures.push(DescentFailure {
                element: root.id.clone(),
                error,
            });
            return descent;
        }
    };

    // (node, parent, depth); pushed in reverse so pops follow page order
    let mut stack: Vec<(Element, ElementId, usize)> = root_children
        .into_iter()
        .rev()
        .map(|child| (child, root.id.clone(), 1))
        .collect();

    while let Some((node, parent, depth)) = stack.pop() {
        if !visited.insert(node.id.clone()) {
            descent.revisited += 1;
            continue;
        }

        let node_children = match children(store, &node.id, spec) {
            Ok(children) => children,
            Err(error) => {
                descent.failures.push(DescentFailure {
                    element: node.id.clone(),
                    error,
                });
                continue;
            }
        };

        if node_children.is_empty() {
            descent.leaves.push(Leaf {
                element: node,
                parent,
                depth,
            });
        } else if depth >= spec.max_depth {
            descent.truncated.push(node.id.clone());
        } else {
            for child in node_children.into_iter().rev() {
                stack.push((child, node.id.clone(), depth + 1));
            }
        }
    }

    descent
}

/// Number of distinct elements reachable from `root` along `relationship`
/// (root excluded), e.g. every reply in a comment thread
pub fn count_reachable(
    store: &dyn MetadataStore,
    root: &ElementId,
    relationship: &str,
    page_size: usize,
    max_depth: usize,
) -> StorageResult<usize> {
    let mut visited: HashSet<ElementId> = HashSet::new();
    visited.insert(root.clone());
    let mut frontier = vec![(root.clone(), 0usize)];
    let mut count = 0;

    while let Some((node, depth)) = frontier.pop() {
        if depth >= max_depth {
            tracing::debug!(element = %node, max_depth, "reachability walk hit depth cap");
            continue;
        }
        for view in for_each_related(store, &node, Some(relationship), Direction::Outgoing, page_size) {
            let child = view?.element.id;
            if visited.insert(child.clone()) {
                count += 1;
                frontier.push((child, depth + 1));
            }
        }
    }

    Ok(count)
}
