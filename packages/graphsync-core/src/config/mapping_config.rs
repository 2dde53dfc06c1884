//! Mapping configuration
//!
//! The immutable configuration object shared by every engine call: the
//! defaults plus one ordered [`MapperSet`] per entity kind. All parsing,
//! template/condition compilation and validation happens here, so a
//! `MappingConfig` that exists is known to be valid.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use super::error::{ConfigError, ConfigResult};
use super::io::{MappingConfigFile, SUPPORTED_VERSIONS};
use crate::domain::{EntityKind, GraphDocumentMapper, MapperSet, MappingDefaults};
use crate::mapping::MappingRuleSpec;

/// Validated mapping configuration
#[derive(Debug, Clone)]
pub struct MappingConfig {
    defaults: MappingDefaults,
    node_mappers: MapperSet,
    relationship_mappers: MapperSet,
}

impl MappingConfig {
    /// Start a programmatic configuration
    pub fn builder(defaults: MappingDefaults) -> MappingConfigBuilder {
        MappingConfigBuilder::new(defaults)
    }

    /// Compile a parsed configuration document
    pub fn from_file(file: MappingConfigFile) -> ConfigResult<Self> {
        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut builder = MappingConfigBuilder::new(file.defaults);
        for rule in file.node_mappings {
            builder = builder.node_rule(rule);
        }
        for rule in file.relationship_mappings {
            builder = builder.relationship_rule(rule);
        }
        builder.build()
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Self::from_file(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Self::from_file(serde_yaml::from_str(yaml)?)
    }

    /// Load from disk; the format follows the file extension
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;

        let config = match extension.as_str() {
            "json" => Self::from_json_str(&content)?,
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!(
            "Loaded mapping config from {}: {} node mappers, {} relationship mappers",
            path.display(),
            config.node_mappers.len(),
            config.relationship_mappers.len()
        );
        Ok(config)
    }

    pub fn defaults(&self) -> &MappingDefaults {
        &self.defaults
    }

    pub fn node_mappers(&self) -> &MapperSet {
        &self.node_mappers
    }

    pub fn relationship_mappers(&self) -> &MapperSet {
        &self.relationship_mappers
    }

    /// Mapper set responsible for `kind`
    pub fn mappers_for(&self, kind: EntityKind) -> &MapperSet {
        match kind {
            EntityKind::Node => &self.node_mappers,
            EntityKind::Relationship => &self.relationship_mappers,
        }
    }
}

enum Entry {
    Rule(MappingRuleSpec),
    Mapper(Arc<dyn GraphDocumentMapper>),
}

/// Builder for [`MappingConfig`]
///
/// Configured rules and custom mappers keep the order they were added in.
pub struct MappingConfigBuilder {
    defaults: MappingDefaults,
    nodes: Vec<Entry>,
    relationships: Vec<Entry>,
}

impl MappingConfigBuilder {
    pub fn new(defaults: MappingDefaults) -> Self {
        Self {
            defaults,
            nodes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn node_rule(mut self, rule: MappingRuleSpec) -> Self {
        self.nodes.push(Entry::Rule(rule));
        self
    }

    pub fn relationship_rule(mut self, rule: MappingRuleSpec) -> Self {
        self.relationships.push(Entry::Rule(rule));
        self
    }

    pub fn node_mapper(mut self, mapper: impl GraphDocumentMapper + 'static) -> Self {
        self.nodes.push(Entry::Mapper(Arc::new(mapper)));
        self
    }

    pub fn relationship_mapper(mut self, mapper: impl GraphDocumentMapper + 'static) -> Self {
        self.relationships.push(Entry::Mapper(Arc::new(mapper)));
        self
    }

    pub fn build(self) -> ConfigResult<MappingConfig> {
        self.defaults.validate()?;

        Ok(MappingConfig {
            node_mappers: compile_set(EntityKind::Node, self.nodes)?,
            relationship_mappers: compile_set(EntityKind::Relationship, self.relationships)?,
            defaults: self.defaults,
        })
    }
}

fn compile_set(kind: EntityKind, entries: Vec<Entry>) -> ConfigResult<MapperSet> {
    let mut names = HashSet::new();

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            let mapper = match entry {
                Entry::Rule(rule) => rule.compile(kind, position)?,
                Entry::Mapper(mapper) => mapper,
            };
            if !names.insert(mapper.name().to_string()) {
                return Err(ConfigError::DuplicateMapper {
                    kind: kind.to_string(),
                    name: mapper.name().to_string(),
                });
            }
            tracing::debug!("Registered {} mapper '{}' at position {}", kind, mapper.name(), position);
            Ok(mapper)
        })
        .collect()
}
