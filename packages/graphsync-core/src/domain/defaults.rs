//! Process-wide mapping defaults
//!
//! Consulted whenever a rule does not specify its own index, type or id
//! source. Built once at startup and shared read-only.

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use crate::config::{ConfigError, ConfigResult};

pub const DEFAULT_KEY_PROPERTY: &str = "uuid";
pub const DEFAULT_INDEX: &str = "graph";
pub const DEFAULT_TYPE: &str = "_doc";

/// Fallback configuration for mapping rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingDefaults {
    /// Property holding the document id when a rule has no id template
    pub key_property: String,

    /// Fallback index for every entity kind
    pub index: String,

    /// Node index override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_index: Option<String>,

    /// Relationship index override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_index: Option<String>,

    /// Fallback type/collection name
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Copy unmapped properties into the payload
    pub include_remaining_properties: bool,

    pub blacklisted_node_properties: Vec<String>,

    pub blacklisted_relationship_properties: Vec<String>,

    /// Drop null, empty-string and empty-collection fields from payloads
    pub exclude_empty_properties: bool,
}

impl Default for MappingDefaults {
    fn default() -> Self {
        Self {
            key_property: DEFAULT_KEY_PROPERTY.to_string(),
            index: DEFAULT_INDEX.to_string(),
            nodes_index: None,
            relationships_index: None,
            doc_type: DEFAULT_TYPE.to_string(),
            include_remaining_properties: true,
            blacklisted_node_properties: Vec::new(),
            blacklisted_relationship_properties: Vec::new(),
            exclude_empty_properties: false,
        }
    }
}

impl MappingDefaults {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            ..Self::default()
        }
    }

    pub fn with_key_property(mut self, key_property: impl Into<String>) -> Self {
        self.key_property = key_property.into();
        self
    }

    /// Fallback index for an entity kind
    pub fn index_for(&self, kind: EntityKind) -> &str {
        let specific = match kind {
            EntityKind::Node => self.nodes_index.as_deref(),
            EntityKind::Relationship => self.relationships_index.as_deref(),
        };
        specific.unwrap_or(&self.index)
    }

    pub fn is_blacklisted(&self, kind: EntityKind, property: &str) -> bool {
        let blacklist = match kind {
            EntityKind::Node => &self.blacklisted_node_properties,
            EntityKind::Relationship => &self.blacklisted_relationship_properties,
        };
        blacklist.iter().any(|p| p == property)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("key_property", Some(self.key_property.as_str())),
            ("index", Some(self.index.as_str())),
            ("type", Some(self.doc_type.as_str())),
            ("nodes_index", self.nodes_index.as_deref()),
            ("relationships_index", self.relationships_index.as_deref()),
        ];

        for (field, value) in required {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidDefaults {
                        field: field.to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
