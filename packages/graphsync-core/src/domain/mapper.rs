//! Mapper port and ordered mapper sets
//!
//! A mapper is a named rule split into a cheap applicability check
//! (`supports`) and a fallible transformation (`map`). The engine only calls
//! `map`/`locate` on entities for which `supports` returned true.

use std::fmt;
use std::sync::Arc;

use super::defaults::MappingDefaults;
use super::document::{DocumentRepresentation, DocumentTarget};
use super::entity::EntitySnapshot;
use crate::error::MappingResult;

/// Graph entity to search document rule
///
/// Implementations must be deterministic and side-effect free: the same
/// snapshot and defaults always produce the same result.
pub trait GraphDocumentMapper: fmt::Debug + Send + Sync {
    /// Rule name, used in logs and failure reports
    fn name(&self) -> &str;

    /// Pure predicate; a missing property means `false`, never an error
    fn supports(&self, entity: &EntitySnapshot) -> bool;

    /// Resolve the document (target and payload) for a supported entity
    fn map(&self, entity: &EntitySnapshot, defaults: &MappingDefaults)
        -> MappingResult<DocumentRepresentation>;

    /// Resolve only the document address, used by the delete path
    ///
    /// The default derives the target from [`map`](Self::map); rules that can
    /// resolve the address without building a payload should override it.
    fn locate(&self, entity: &EntitySnapshot, defaults: &MappingDefaults) -> MappingResult<DocumentTarget> {
        self.map(entity, defaults).map(|doc| doc.target())
    }
}

/// Ordered collection of mappers for one entity kind
#[derive(Debug, Clone, Default)]
pub struct MapperSet {
    mappers: Vec<Arc<dyn GraphDocumentMapper>>,
}

impl MapperSet {
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Mappers in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn GraphDocumentMapper>> {
        self.mappers.iter()
    }

    /// Mappers whose `supports` holds for `entity`, in configuration order
    pub fn applicable<'a>(
        &'a self,
        entity: &'a EntitySnapshot,
    ) -> impl Iterator<Item = &'a Arc<dyn GraphDocumentMapper>> + 'a {
        self.mappers.iter().filter(move |mapper| mapper.supports(entity))
    }

    pub fn names(&self) -> Vec<&str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }
}

impl FromIterator<Arc<dyn GraphDocumentMapper>> for MapperSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn GraphDocumentMapper>>>(iter: I) -> Self {
        Self {
            mappers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeSnapshot;

    #[derive(Debug)]
    struct LabelMapper(&'static str);

    impl GraphDocumentMapper for LabelMapper {
        fn name(&self) -> &str {
            self.0
        }

        fn supports(&self, entity: &EntitySnapshot) -> bool {
            entity.has_label(self.0)
        }

        fn map(
            &self,
            entity: &EntitySnapshot,
            _defaults: &MappingDefaults,
        ) -> MappingResult<DocumentRepresentation> {
            Ok(DocumentRepresentation::new(
                DocumentTarget::new(self.0.to_lowercase(), "doc", entity.id().to_string()),
                b"{}".to_vec(),
            ))
        }
    }

    #[test]
    fn test_applicable_keeps_order() {
        let set: MapperSet = ["Person", "City", "Admin"]
            .into_iter()
            .map(|label| Arc::new(LabelMapper(label)) as Arc<dyn GraphDocumentMapper>)
            .collect();
        let entity: EntitySnapshot = NodeSnapshot::new(1).with_label("Admin").with_label("Person").into();

        let names: Vec<&str> = set.applicable(&entity).map(|m| m.name()).collect();
        assert_eq!(names, vec!["Person", "Admin"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_default_locate_uses_map() {
        let mapper = LabelMapper("Person");
        let entity: EntitySnapshot = NodeSnapshot::new(9).with_label("Person").into();

        let target = mapper.locate(&entity, &MappingDefaults::default()).unwrap();
        assert_eq!(target, DocumentTarget::new("person", "doc", "9"));
    }
}
