//! Mapping configuration
//!
//! Loaded once at startup from JSON or YAML (or assembled with the
//! builder) and shared read-only afterwards.
//!
//! # Examples
//!
//! ```rust,ignore
//! use graphsync_core::config::MappingConfig;
//!
//! let config = MappingConfig::from_path("mappings.yaml")?;
//! let config = MappingConfig::builder(MappingDefaults::default())
//!     .node_rule(rule)
//!     .node_mapper(MyCustomMapper)
//!     .build()?;
//! ```

pub mod error;
pub mod io;
pub mod mapping_config;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use io::{MappingConfigFile, SUPPORTED_VERSIONS};
pub use mapping_config::{MappingConfig, MappingConfigBuilder};
