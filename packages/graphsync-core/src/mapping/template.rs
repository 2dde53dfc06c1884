//! String templates resolved against entity properties
//!
//! `"people-{country}"` renders to `people-fr` for an entity whose
//! `country` property is `"fr"`. Reserved references start with `@`:
//!
//! - `{@id}`: graph identity
//! - `{@label}`: first node label, or relationship type
//! - `{@kind}`: `node` / `relationship`
//!
//! `{{` and `}}` produce literal braces. Templates are parsed once at
//! startup; parse problems are configuration errors, resolution problems
//! are mapping errors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use crate::config::{ConfigError, ConfigResult};
use crate::domain::EntitySnapshot;
use crate::error::{MappingError, MappingResult};

static REFERENCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@?[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reference {
    Id,
    Label,
    Kind,
    Property(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Reference),
}

/// Parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`; `field` names the template's role for error messages
    pub fn parse(field: &str, source: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidTemplate {
            mapper: String::new(),
            field: field.to_string(),
            template: source.to_string(),
            reason,
        };

        if source.trim().is_empty() {
            return Err(invalid("template is empty".to_string()));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("unmatched '}'".to_string())),
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(invalid("unclosed '{'".to_string()));
                    }

                    let name = name.trim();
                    if !REFERENCE_NAME.is_match(name) {
                        return Err(invalid(format!("invalid reference '{{{}}}'", name)));
                    }
                    let reference = match name {
                        "@id" => Reference::Id,
                        "@label" => Reference::Label,
                        "@kind" => Reference::Kind,
                        n if n.starts_with('@') => {
                            return Err(invalid(format!("unknown reserved reference '{}'", n)))
                        }
                        n => Reference::Property(n.to_string()),
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(reference));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Template that renders to `value` verbatim
    pub fn literal(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            segments: vec![Segment::Literal(value.clone())],
            source: value.replace('{', "{{").replace('}', "}}"),
        }
    }

    /// Template for a single property lookup
    pub fn property(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: format!("{{{}}}", name),
            segments: vec![Segment::Placeholder(Reference::Property(name))],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when rendering does not depend on the entity
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Render to a string; every placeholder must resolve to a scalar
    pub fn render(&self, entity: &EntitySnapshot) -> MappingResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(reference) => out.push_str(&self.resolve(reference, entity)?),
            }
        }
        Ok(out)
    }

    /// Render to a JSON value for payload fields
    ///
    /// A template made of exactly one property placeholder keeps the
    /// property's JSON type, and a missing property yields `null`.
    pub fn render_value(&self, entity: &EntitySnapshot) -> MappingResult<Value> {
        if let [Segment::Placeholder(Reference::Property(name))] = self.segments.as_slice() {
            return Ok(entity.property(name).cloned().unwrap_or(Value::Null));
        }
        self.render(entity).map(Value::String)
    }

    fn resolve(&self, reference: &Reference, entity: &EntitySnapshot) -> MappingResult<String> {
        match reference {
            Reference::Id => Ok(entity.id().to_string()),
            Reference::Kind => Ok(entity.kind().as_str().to_string()),
            Reference::Label => entity
                .primary_label()
                .map(str::to_string)
                .ok_or_else(|| MappingError::unresolvable_template(&self.source, "entity has no label")),
            Reference::Property(name) => {
                let value = entity
                    .property(name)
                    .ok_or_else(|| MappingError::missing_property(name.as_str()))?;
                scalar_to_string(value).ok_or_else(|| {
                    MappingError::invalid_value(name.as_str(), format!("{} is not a scalar", json_type(value)))
                })
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// String form of a scalar JSON value
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeSnapshot, RelationshipSnapshot};
    use crate::error::ErrorKind;
    use serde_json::json;

    fn person() -> EntitySnapshot {
        NodeSnapshot::new(42)
            .with_label("Person")
            .with_property("uid", "u-42")
            .with_property("country", "fr")
            .with_property("age", 31)
            .with_property("tags", json!(["a", "b"]))
            .into()
    }

    #[test]
    fn test_render_mixed_segments() {
        let template = Template::parse("index", "people-{country}-{@kind}").unwrap();
        assert_eq!(template.render(&person()).unwrap(), "people-fr-node");
        assert!(!template.is_static());
    }

    #[test]
    fn test_render_reserved_references() {
        let template = Template::parse("id", "{@label}:{@id}").unwrap();
        assert_eq!(template.render(&person()).unwrap(), "Person:42");

        let rel: EntitySnapshot = RelationshipSnapshot::new(7, "KNOWS", 1, 2).into();
        assert_eq!(template.render(&rel).unwrap(), "KNOWS:7");
    }

    #[test]
    fn test_render_number_property() {
        let template = Template::parse("id", "age-{age}").unwrap();
        assert_eq!(template.render(&person()).unwrap(), "age-31");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("index", "{{literal}}").unwrap();
        assert!(template.is_static());
        assert_eq!(template.render(&person()).unwrap(), "{literal}");
    }

    #[test]
    fn test_missing_property_is_mapping_error() {
        let template = Template::parse("index", "places-{region}").unwrap();
        let err = template.render(&person()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingProperty);
        assert!(err.message.contains("region"));
    }

    #[test]
    fn test_non_scalar_property_is_mapping_error() {
        let template = Template::parse("id", "{tags}").unwrap();
        let err = template.render(&person()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert!(err.message.contains("array"));
    }

    #[test]
    fn test_label_missing_on_unlabelled_node() {
        let node: EntitySnapshot = NodeSnapshot::new(1).into();
        let template = Template::parse("type", "{@label}").unwrap();
        let err = template.render(&node).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvableTemplate);
    }

    #[test]
    fn test_render_value_keeps_json_type() {
        let entity = person();
        assert_eq!(Template::property("age").render_value(&entity).unwrap(), json!(31));
        assert_eq!(Template::property("tags").render_value(&entity).unwrap(), json!(["a", "b"]));
        assert_eq!(Template::property("missing").render_value(&entity).unwrap(), Value::Null);

        let composite = Template::parse("field", "{uid} ({age})").unwrap();
        assert_eq!(composite.render_value(&entity).unwrap(), json!("u-42 (31)"));
    }

    #[test]
    fn test_parse_errors() {
        for source in ["", "people-{", "people-}", "{}", "{bad name}", "{@nope}"] {
            let result = Template::parse("index", source);
            assert!(
                matches!(result, Err(ConfigError::InvalidTemplate { .. })),
                "expected error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_literal_constructor_roundtrips_source() {
        let template = Template::literal("a{b}");
        assert_eq!(template.render(&person()).unwrap(), "a{b}");
        assert_eq!(Template::parse("x", template.source()).unwrap(), template);
    }
}
