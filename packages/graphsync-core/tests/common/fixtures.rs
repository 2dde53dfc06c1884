//! Mapper fixtures

use graphsync_core::{
    Condition, DocumentRepresentation, EntityKind, EntitySnapshot, ExpressionMapper,
    GraphDocumentMapper, MappingDefaults, MappingError, MappingResult, Template,
};

/// Any node -> people/person/{uid}
pub fn people_mapper() -> ExpressionMapper {
    ExpressionMapper::new("people", EntityKind::Node, Condition::Kind(EntityKind::Node))
        .with_index(Template::literal("people"))
        .with_type(Template::literal("person"))
        .with_id(Template::property("uid"))
}

/// `City` nodes -> places/city/{name}
pub fn city_mapper() -> ExpressionMapper {
    ExpressionMapper::new("cities", EntityKind::Node, Condition::HasLabel("City".to_string()))
        .with_index(Template::literal("places"))
        .with_type(Template::literal("city"))
        .with_id(Template::property("name"))
}

/// Supports every node and always fails to map
#[derive(Debug)]
pub struct FailingMapper;

impl GraphDocumentMapper for FailingMapper {
    fn name(&self) -> &str {
        "failing"
    }

    fn supports(&self, entity: &EntitySnapshot) -> bool {
        entity.kind() == EntityKind::Node
    }

    fn map(&self, _entity: &EntitySnapshot, _defaults: &MappingDefaults) -> MappingResult<DocumentRepresentation> {
        Err(MappingError::unresolvable_template("{broken}", "always fails"))
    }
}
