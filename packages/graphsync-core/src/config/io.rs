//! Configuration file schema (JSON/YAML)
//!
//! Defines the on-disk document. Loading and compilation live in
//! mapping_config.rs.

use serde::{Deserialize, Serialize};

use crate::domain::MappingDefaults;
use crate::mapping::MappingRuleSpec;

/// Schema versions this crate can load
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

fn default_version() -> u32 {
    1
}

/// Mapping configuration document, schema v1
///
/// ```json
/// {
///   "defaults": { "key_property": "uid", "index": "graph" },
///   "node_mappings": [
///     { "mapper": "expression", "condition": "hasLabel('Person')", "index": "people", "type": "person" }
///   ],
///   "relationship_mappings": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfigFile {
    /// Schema version (1 when omitted)
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub defaults: MappingDefaults,

    #[serde(default)]
    pub node_mappings: Vec<MappingRuleSpec>,

    #[serde(default)]
    pub relationship_mappings: Vec<MappingRuleSpec>,
}
