//! Built-in mapping rules and the languages they are configured with
//!
//! - `condition`: applicability predicates (`hasLabel('City') && ...`)
//! - `template`: `{property}` string templates for index/type/id and fields
//! - `rule`: `expression` and `passthrough` rules plus their descriptors

pub mod condition;
mod payload;
pub mod rule;
pub mod template;

pub use condition::Condition;
pub use rule::{
    ExpressionMapper, ExpressionRuleSpec, MappingRuleSpec, PassthroughMapper, PassthroughRuleSpec,
};
pub use template::Template;
