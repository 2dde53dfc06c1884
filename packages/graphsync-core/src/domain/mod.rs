//! Domain layer
//!
//! - `EntitySnapshot`: immutable node/relationship view from the change source
//! - `DocumentRepresentation` / `Action`: what mappers produce and the transport consumes
//! - `MappingDefaults`: fallback index/type/id configuration
//! - `GraphDocumentMapper` / `MapperSet`: the rule port and its ordered collection

pub mod defaults;
pub mod document;
pub mod entity;
pub mod mapper;

pub use defaults::MappingDefaults;
pub use document::{Action, DocumentLocation, DocumentRepresentation, DocumentTarget};
pub use entity::{EntityKind, EntitySnapshot, NodeSnapshot, PropertyMap, RelationshipSnapshot};
pub use mapper::{GraphDocumentMapper, MapperSet};
