//! Error types for graphsync-core
//!
//! `MappingError` is the only error a mapper may raise. It is always
//! recovered per mapper by the sync engine; configuration problems use
//! [`crate::config::ConfigError`] instead.

use std::fmt;
use thiserror::Error;

/// Mapping error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A property needed for id/index/type resolution is absent
    MissingProperty,
    /// A property is present but cannot be used (null, object, empty)
    InvalidValue,
    /// A template could not be rendered against the entity
    UnresolvableTemplate,
    /// Payload serialization failed
    Serialization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingProperty => "missing_property",
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::UnresolvableTemplate => "unresolvable_template",
            ErrorKind::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mapping error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct MappingError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl MappingError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn missing_property(property: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::MissingProperty,
            format!("Property not found: {}", property.into()),
        )
    }

    pub fn invalid_value(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::InvalidValue,
            format!("Unusable value for '{}': {}", property.into(), reason.into()),
        )
    }

    pub fn unresolvable_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnresolvableTemplate,
            format!("Cannot resolve '{}': {}", template.into(), reason.into()),
        )
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }
}

// JSON error conversions
impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> Self {
        MappingError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type MappingResult<T> = std::result::Result<T, MappingError>;
