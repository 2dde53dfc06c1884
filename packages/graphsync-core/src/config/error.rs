//! Configuration error types
//!
//! Raised only while building a [`MappingConfig`](super::MappingConfig);
//! once a config exists, no configuration error can surface mid-stream.

use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unsupported version
    #[error("Unsupported configuration version {found}. Supported versions: {}", supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    /// File extension not recognised
    #[error("Unsupported configuration format '{0}'. Use .json, .yaml or .yml")]
    UnsupportedFormat(String),

    /// Condition expression failed to parse
    #[error("Invalid condition in mapper '{mapper}': {reason} (expression: {expression})")]
    InvalidCondition {
        mapper: String,
        expression: String,
        reason: String,
    },

    /// Template failed to parse
    #[error("Invalid {field} template in mapper '{mapper}': {reason} (template: {template})")]
    InvalidTemplate {
        mapper: String,
        field: String,
        template: String,
        reason: String,
    },

    /// Two mappers in the same set share a name
    #[error("Duplicate {kind} mapper name '{name}'. Mapper names must be unique per entity kind")]
    DuplicateMapper { kind: String, name: String },

    /// Defaults failed validation
    #[error("Invalid defaults field '{field}': {reason}")]
    InvalidDefaults { field: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Attach the owning mapper's name to a parse error
    pub(crate) fn in_mapper(self, name: &str) -> Self {
        match self {
            ConfigError::InvalidCondition { expression, reason, .. } => ConfigError::InvalidCondition {
                mapper: name.to_string(),
                expression,
                reason,
            },
            ConfigError::InvalidTemplate { field, template, reason, .. } => ConfigError::InvalidTemplate {
                mapper: name.to_string(),
                field,
                template,
                reason,
            },
            other => other,
        }
    }
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = ConfigError::UnsupportedVersion {
            found: 3,
            supported: vec![1],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported configuration version 3. Supported versions: 1"
        );
    }

    #[test]
    fn test_in_mapper_fills_name() {
        let err = ConfigError::InvalidTemplate {
            mapper: String::new(),
            field: "index".to_string(),
            template: "people-{".to_string(),
            reason: "unclosed '{'".to_string(),
        }
        .in_mapper("people");

        let msg = err.to_string();
        assert!(msg.contains("mapper 'people'"));
        assert!(msg.contains("people-{"));
    }

    #[test]
    fn test_in_mapper_leaves_other_errors() {
        let err = ConfigError::UnsupportedFormat("toml".to_string()).in_mapper("x");
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
