//! Document payload assembly
//!
//! Remaining entity properties (minus the blacklist) form the base object,
//! mapped fields are laid over it, and empty values are dropped when the
//! defaults ask for it.

use serde_json::{Map, Value};

use super::template::Template;
use crate::domain::{EntitySnapshot, MappingDefaults};
use crate::error::MappingResult;

pub(crate) fn build_payload(
    entity: &EntitySnapshot,
    defaults: &MappingDefaults,
    fields: &[(String, Template)],
    include_remaining: bool,
) -> MappingResult<Vec<u8>> {
    let kind = entity.kind();
    let mut document = Map::new();

    if include_remaining {
        for (name, value) in entity.properties() {
            if !defaults.is_blacklisted(kind, name) {
                document.insert(name.clone(), value.clone());
            }
        }
    }

    for (field, template) in fields {
        document.insert(field.clone(), template.render_value(entity)?);
    }

    if defaults.exclude_empty_properties {
        document.retain(|_, value| !is_empty(value));
    }

    Ok(serde_json::to_vec(&Value::Object(document))?)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeSnapshot;
    use serde_json::json;

    fn entity() -> EntitySnapshot {
        NodeSnapshot::new(1)
            .with_label("Person")
            .with_property("first", "Ada")
            .with_property("last", "Lovelace")
            .with_property("password", "secret")
            .with_property("nickname", "")
            .into()
    }

    fn decode(bytes: Vec<u8>) -> Value {
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_remaining_properties_minus_blacklist() {
        let defaults = MappingDefaults {
            blacklisted_node_properties: vec!["password".to_string()],
            ..MappingDefaults::default()
        };
        let payload = decode(build_payload(&entity(), &defaults, &[], true).unwrap());
        assert_eq!(payload, json!({"first": "Ada", "last": "Lovelace", "nickname": ""}));
    }

    #[test]
    fn test_mapped_fields_only() {
        let fields = vec![(
            "name".to_string(),
            Template::parse("name", "{first} {last}").unwrap(),
        )];
        let payload = decode(build_payload(&entity(), &MappingDefaults::default(), &fields, false).unwrap());
        assert_eq!(payload, json!({"name": "Ada Lovelace"}));
    }

    #[test]
    fn test_mapped_field_overrides_property() {
        let fields = vec![("first".to_string(), Template::literal("redacted"))];
        let payload = decode(build_payload(&entity(), &MappingDefaults::default(), &fields, true).unwrap());
        assert_eq!(payload["first"], json!("redacted"));
    }

    #[test]
    fn test_exclude_empty() {
        let defaults = MappingDefaults {
            exclude_empty_properties: true,
            ..MappingDefaults::default()
        };
        let fields = vec![("region".to_string(), Template::property("region"))];
        let payload = decode(build_payload(&entity(), &defaults, &fields, true).unwrap());
        assert!(payload.get("nickname").is_none());
        assert!(payload.get("region").is_none());
        assert_eq!(payload["first"], json!("Ada"));
    }

    #[test]
    fn test_composite_field_with_missing_property_fails() {
        let fields = vec![("label".to_string(), Template::parse("label", "{first}-{region}").unwrap())];
        assert!(build_payload(&entity(), &MappingDefaults::default(), &fields, false).is_err());
    }
}
