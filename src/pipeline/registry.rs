//! Element type dispatch
//!
//! Each synchronized element is resolved once to an [`ElementKind`], which
//! selects the resolvers and projections applied to it.

use crate::graph::vocab::types;
use crate::graph::Element;
use std::collections::HashMap;

/// Element families the harvester knows how to project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Asset,
    Glossary,
    GlossaryTerm,
    Collection,
    Project,
    Team,
    Location,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        Self::Asset,
        Self::Glossary,
        Self::GlossaryTerm,
        Self::Collection,
        Self::Project,
        Self::Team,
        Self::Location,
    ];

    /// Canonical type name in the metadata graph
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Asset => types::ASSET,
            Self::Glossary => types::GLOSSARY,
            Self::GlossaryTerm => types::GLOSSARY_TERM,
            Self::Collection => types::COLLECTION,
            Self::Project => types::PROJECT,
            Self::Team => types::TEAM,
            Self::Location => types::LOCATION,
        }
    }
}

/// Maps type names (canonical names and registered subtypes) to kinds
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    kinds: HashMap<String, ElementKind>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeRegistry {
    /// Every [`ElementKind`] under its canonical type name
    pub fn standard() -> Self {
        Self {
            kinds: ElementKind::ALL
                .iter()
                .map(|kind| (kind.type_name().to_string(), *kind))
                .collect(),
        }
    }

    /// Treat `type_name` as `kind`, e.g. a subtype that is listed by name in the config
    pub fn with_alias(mut self, type_name: impl Into<String>, kind: ElementKind) -> Self {
        self.kinds.insert(type_name.into(), kind);
        self
    }

    pub fn kind_of(&self, type_name: &str) -> Option<ElementKind> {
        self.kinds.get(type_name).copied()
    }

    /// The kind of the element's own type, else of its nearest registered super type
    pub fn classify(&self, element: &Element) -> Option<ElementKind> {
        std::iter::once(&element.type_name)
            .chain(element.super_types.iter())
            .find_map(|name| self.kind_of(name))
    }

    pub fn is_known(&self, type_name: &str) -> bool {
        self.kinds.contains_key(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_knows_every_kind() {
        let registry = TypeRegistry::standard();
        for kind in ElementKind::ALL {
            assert_eq!(registry.kind_of(kind.type_name()), Some(kind));
        }
        assert!(!registry.is_known("DataSet"));
    }

    #[test]
    fn subtypes_classify_through_super_types() {
        let registry = TypeRegistry::standard();
        let dataset = Element::new("DataSet").with_super_types(["Asset", "Referenceable"]);
        assert_eq!(registry.classify(&dataset), Some(ElementKind::Asset));
        let unrelated = Element::new("Comment");
        assert_eq!(registry.classify(&unrelated), None);
    }

    #[test]
    fn alias_wins_over_super_type() {
        let registry = TypeRegistry::standard().with_alias("DataSet", ElementKind::Collection);
        let dataset = Element::new("DataSet").with_super_types(["Asset"]);
        assert_eq!(registry.classify(&dataset), Some(ElementKind::Collection));
    }
}
