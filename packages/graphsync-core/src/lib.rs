//! graphsync-core - Graph to search-index mapping and reconciliation
//!
//! Keeps a denormalized search index in step with a graph store. For each
//! entity transition it decides which documents must be written and which
//! have gone stale, and returns the corresponding backend actions. It does
//! no I/O: the action list is handed to a bulk-write transport.
//!
//! ## Core Principles
//!
//! 1. **Independent rules**: every mapper decides on its own whether an
//!    entity becomes a document, and where
//! 2. **Location diff**: on update, a previous document is deleted only when
//!    its (index, type) location is no longer written by any mapper
//! 3. **Partial success**: one mapper failing never drops another mapper's
//!    actions; failures come back next to the actions
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use graphsync_core::{Action, MappingConfig, NodeSnapshot, SyncEngine};
//!
//! let config = MappingConfig::from_yaml_str(r#"
//! node_mappings:
//!   - mapper: expression
//!     condition: "hasLabel('Person')"
//!     index: people
//!     type: person
//!     id: "{uid}"
//! "#).unwrap();
//! let engine = SyncEngine::new(Arc::new(config));
//!
//! let before = NodeSnapshot::new(1).with_label("Person").with_property("uid", "42").into();
//! let after = NodeSnapshot::new(1).with_label("City").with_property("uid", "42").into();
//!
//! let outcome = engine.update(&before, &after);
//! assert_eq!(outcome.actions, vec![Action::delete("people", "person", "42")]);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod mapping;

pub use error::{ErrorKind, MappingError, MappingResult};

// Domain re-exports
pub use domain::{
    Action, DocumentLocation, DocumentRepresentation, DocumentTarget, EntityKind, EntitySnapshot,
    GraphDocumentMapper, MapperSet, MappingDefaults, NodeSnapshot, PropertyMap,
    RelationshipSnapshot,
};

pub use application::{MappingFailure, SyncEngine, SyncOperation, SyncOutcome, Transition};
pub use config::{ConfigError, ConfigResult, MappingConfig, MappingConfigBuilder};
pub use mapping::{Condition, ExpressionMapper, MappingRuleSpec, PassthroughMapper, Template};
