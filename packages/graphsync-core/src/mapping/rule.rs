//! Built-in mapping rules
//!
//! Rules are configured as value-like descriptors ([`MappingRuleSpec`]),
//! tagged by `mapper`, and compiled once into [`GraphDocumentMapper`]
//! implementations:
//!
//! - `expression`: condition + index/type/id templates + mapped fields
//! - `passthrough`: every entity of the set's kind, all of its properties
//!
//! ```yaml
//! node_mappings:
//!   - mapper: expression
//!     name: cities
//!     condition: "hasLabel('City')"
//!     index: "places-{country}"
//!     type: city
//!     id: "{name}"
//!     properties:
//!       title: "{name} ({country})"
//!   - mapper: passthrough
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::condition::Condition;
use super::payload::build_payload;
use super::template::{scalar_to_string, Template};
use crate::config::ConfigResult;
use crate::domain::{
    DocumentRepresentation, DocumentTarget, EntityKind, EntitySnapshot, GraphDocumentMapper,
    MappingDefaults,
};
use crate::error::{MappingError, MappingResult};

// ═══════════════════════════════════════════════════════════════════════════
// Rule descriptors (configuration form)
// ═══════════════════════════════════════════════════════════════════════════

/// Configured rule, before compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mapper", rename_all = "snake_case")]
pub enum MappingRuleSpec {
    Expression(ExpressionRuleSpec),
    Passthrough(PassthroughRuleSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpressionRuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Condition expression, see [`Condition`]
    pub condition: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Id template; the defaults' key property when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Payload field name -> template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,

    /// Overrides `MappingDefaults::include_remaining_properties`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_remaining_properties: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassthroughRuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl MappingRuleSpec {
    pub fn name(&self) -> Option<&str> {
        match self {
            MappingRuleSpec::Expression(spec) => spec.name.as_deref(),
            MappingRuleSpec::Passthrough(spec) => spec.name.as_deref(),
        }
    }

    /// Name used when the rule is unnamed: `node_mapping_0`, ...
    pub fn default_name(kind: EntityKind, position: usize) -> String {
        format!("{}_mapping_{}", kind, position)
    }

    /// Compile into a mapper for `kind`; `position` is the rule's index in its set
    pub fn compile(&self, kind: EntityKind, position: usize) -> ConfigResult<Arc<dyn GraphDocumentMapper>> {
        let name = self
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| Self::default_name(kind, position));

        let mapper: Arc<dyn GraphDocumentMapper> = match self {
            MappingRuleSpec::Expression(spec) => {
                Arc::new(ExpressionMapper::from_spec(name.clone(), kind, spec).map_err(|e| e.in_mapper(&name))?)
            }
            MappingRuleSpec::Passthrough(spec) => {
                Arc::new(PassthroughMapper::from_spec(name.clone(), kind, spec).map_err(|e| e.in_mapper(&name))?)
            }
        };
        Ok(mapper)
    }
}

fn optional_template(field: &str, source: Option<&String>) -> ConfigResult<Option<Template>> {
    source.map(|s| Template::parse(field, s)).transpose()
}

// ═══════════════════════════════════════════════════════════════════════════
// Target resolution shared by both rules
// ═══════════════════════════════════════════════════════════════════════════

fn resolve_target(
    entity: &EntitySnapshot,
    defaults: &MappingDefaults,
    index: Option<&Template>,
    doc_type: Option<&Template>,
    id: Option<&Template>,
) -> MappingResult<DocumentTarget> {
    let index = match index {
        Some(template) => non_empty("index", template.render(entity)?)?,
        None => defaults.index_for(entity.kind()).to_string(),
    };
    let doc_type = match doc_type {
        Some(template) => non_empty("type", template.render(entity)?)?,
        None => defaults.doc_type.clone(),
    };
    let id = match id {
        Some(template) => template.render(entity)?,
        None => {
            let key = defaults.key_property.as_str();
            let value = entity.property(key).ok_or_else(|| MappingError::missing_property(key))?;
            scalar_to_string(value).ok_or_else(|| MappingError::invalid_value(key, "id must be a scalar"))?
        }
    };
    let id = non_empty("id", id)?;

    Ok(DocumentTarget::new(index, doc_type, id))
}

fn non_empty(field: &str, value: String) -> MappingResult<String> {
    if value.is_empty() {
        return Err(MappingError::invalid_value(field, "resolved to an empty string"));
    }
    Ok(value)
}

// ═══════════════════════════════════════════════════════════════════════════
// Expression rule
// ═══════════════════════════════════════════════════════════════════════════

/// Condition-gated rule with templated index/type/id and mapped fields
#[derive(Debug, Clone)]
pub struct ExpressionMapper {
    name: String,
    kind: EntityKind,
    condition: Condition,
    index: Option<Template>,
    doc_type: Option<Template>,
    id: Option<Template>,
    fields: Vec<(String, Template)>,
    include_remaining: Option<bool>,
}

impl ExpressionMapper {
    pub fn new(name: impl Into<String>, kind: EntityKind, condition: Condition) -> Self {
        Self {
            name: name.into(),
            kind,
            condition,
            index: None,
            doc_type: None,
            id: None,
            fields: Vec::new(),
            include_remaining: None,
        }
    }

    fn from_spec(name: String, kind: EntityKind, spec: &ExpressionRuleSpec) -> ConfigResult<Self> {
        let fields = spec
            .properties
            .iter()
            .map(|(field, source)| Ok((field.clone(), Template::parse(field, source)?)))
            .collect::<ConfigResult<Vec<_>>>()?;
        let id = optional_template("id", spec.id.as_ref())?;
        if let Some(template) = id.as_ref().filter(|t| t.is_static()) {
            tracing::warn!(
                "{} mapper '{}' has a constant id '{}'; every matching entity overwrites one document",
                kind,
                name,
                template.source()
            );
        }

        Ok(Self {
            name,
            kind,
            condition: Condition::parse(&spec.condition)?,
            index: optional_template("index", spec.index.as_ref())?,
            doc_type: optional_template("type", spec.doc_type.as_ref())?,
            id,
            fields,
            include_remaining: spec.include_remaining_properties,
        })
    }

    pub fn with_index(mut self, index: Template) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_type(mut self, doc_type: Template) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    pub fn with_id(mut self, id: Template) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>, template: Template) -> Self {
        self.fields.push((field.into(), template));
        self
    }

    pub fn include_remaining(mut self, include: bool) -> Self {
        self.include_remaining = Some(include);
        self
    }
}

impl GraphDocumentMapper for ExpressionMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, entity: &EntitySnapshot) -> bool {
        entity.kind() == self.kind && self.condition.evaluate(entity)
    }

    fn map(&self, entity: &EntitySnapshot, defaults: &MappingDefaults) -> MappingResult<DocumentRepresentation> {
        let target = self.locate(entity, defaults)?;
        let include_remaining = self
            .include_remaining
            .unwrap_or(defaults.include_remaining_properties);
        let payload = build_payload(entity, defaults, &self.fields, include_remaining)?;
        Ok(DocumentRepresentation::new(target, payload))
    }

    fn locate(&self, entity: &EntitySnapshot, defaults: &MappingDefaults) -> MappingResult<DocumentTarget> {
        resolve_target(
            entity,
            defaults,
            self.index.as_ref(),
            self.doc_type.as_ref(),
            self.id.as_ref(),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Passthrough rule
// ═══════════════════════════════════════════════════════════════════════════

/// Maps every entity of one kind with its full property set
#[derive(Debug, Clone)]
pub struct PassthroughMapper {
    name: String,
    kind: EntityKind,
    index: Option<Template>,
    doc_type: Option<Template>,
}

impl PassthroughMapper {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            index: None,
            doc_type: None,
        }
    }

    fn from_spec(name: String, kind: EntityKind, spec: &PassthroughRuleSpec) -> ConfigResult<Self> {
        Ok(Self {
            name,
            kind,
            index: optional_template("index", spec.index.as_ref())?,
            doc_type: optional_template("type", spec.doc_type.as_ref())?,
        })
    }

    pub fn with_index(mut self, index: Template) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_type(mut self, doc_type: Template) -> Self {
        self.doc_type = Some(doc_type);
        self
    }
}

impl GraphDocumentMapper for PassthroughMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, entity: &EntitySnapshot) -> bool {
        entity.kind() == self.kind
    }

    fn map(&self, entity: &EntitySnapshot, defaults: &MappingDefaults) -> MappingResult<DocumentRepresentation> {
        let target = self.locate(entity, defaults)?;
        let payload = build_payload(entity, defaults, &[], true)?;
        Ok(DocumentRepresentation::new(target, payload))
    }

    fn locate(&self, entity: &EntitySnapshot, defaults: &MappingDefaults) -> MappingResult<DocumentTarget> {
        resolve_target(entity, defaults, self.index.as_ref(), self.doc_type.as_ref(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::domain::{NodeSnapshot, RelationshipSnapshot};
    use crate::error::ErrorKind;
    use serde_json::{json, Value};

    fn city() -> EntitySnapshot {
        NodeSnapshot::new(10)
            .with_label("City")
            .with_property("uuid", "c-10")
            .with_property("name", "Paris")
            .with_property("country", "fr")
            .into()
    }

    fn city_spec() -> ExpressionRuleSpec {
        ExpressionRuleSpec {
            name: Some("cities".to_string()),
            condition: "hasLabel('City')".to_string(),
            index: Some("places-{country}".to_string()),
            doc_type: Some("city".to_string()),
            id: Some("{name}".to_string()),
            properties: BTreeMap::from([("title".to_string(), "{name} ({country})".to_string())]),
            include_remaining_properties: Some(false),
        }
    }

    fn payload(doc: &DocumentRepresentation) -> Value {
        serde_json::from_slice(&doc.payload).unwrap()
    }

    #[test]
    fn test_expression_rule_maps_city() {
        let mapper = MappingRuleSpec::Expression(city_spec())
            .compile(EntityKind::Node, 0)
            .unwrap();
        let defaults = MappingDefaults::default();

        assert_eq!(mapper.name(), "cities");
        assert!(mapper.supports(&city()));

        let doc = mapper.map(&city(), &defaults).unwrap();
        assert_eq!(doc.target(), DocumentTarget::new("places-fr", "city", "Paris"));
        assert_eq!(payload(&doc), json!({"title": "Paris (fr)"}));
    }

    #[test]
    fn test_expression_rule_falls_back_to_defaults() {
        let spec = ExpressionRuleSpec {
            name: None,
            condition: "allNodes()".to_string(),
            index: None,
            doc_type: None,
            id: None,
            properties: BTreeMap::new(),
            include_remaining_properties: None,
        };
        let mapper = MappingRuleSpec::Expression(spec).compile(EntityKind::Node, 3).unwrap();
        let defaults = MappingDefaults::new("graph-nodes", "entity");

        assert_eq!(mapper.name(), "node_mapping_3");
        let doc = mapper.map(&city(), &defaults).unwrap();
        assert_eq!(doc.target(), DocumentTarget::new("graph-nodes", "entity", "c-10"));
        assert_eq!(payload(&doc)["name"], json!("Paris"));
    }

    #[test]
    fn test_missing_key_property_is_mapping_error() {
        let mapper = PassthroughMapper::new("all", EntityKind::Node);
        let entity: EntitySnapshot = NodeSnapshot::new(1).with_property("name", "x").into();

        let err = mapper.map(&entity, &MappingDefaults::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingProperty);
        assert!(err.message.contains("uuid"));
    }

    #[test]
    fn test_empty_id_is_mapping_error() {
        let mapper = PassthroughMapper::new("all", EntityKind::Node);
        let entity: EntitySnapshot = NodeSnapshot::new(1).with_property("uuid", "").into();

        let err = mapper.locate(&entity, &MappingDefaults::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_expression_rule_respects_kind() {
        let mapper = ExpressionMapper::new("everything", EntityKind::Node, Condition::Const(true));
        let rel: EntitySnapshot = RelationshipSnapshot::new(1, "KNOWS", 1, 2).into();
        assert!(!mapper.supports(&rel));
        assert!(mapper.supports(&city()));
    }

    #[test]
    fn test_passthrough_relationship_uses_relationship_index() {
        let defaults = MappingDefaults {
            relationships_index: Some("edges".to_string()),
            ..MappingDefaults::default()
        };
        let mapper = PassthroughMapper::new("rels", EntityKind::Relationship).with_type(Template::parse("type", "{@label}").unwrap());
        let rel: EntitySnapshot = RelationshipSnapshot::new(4, "WORKS_AT", 1, 2)
            .with_property("uuid", "r-4")
            .with_property("since", 2020)
            .into();

        let doc = mapper.map(&rel, &defaults).unwrap();
        assert_eq!(doc.target(), DocumentTarget::new("edges", "WORKS_AT", "r-4"));
        assert_eq!(payload(&doc), json!({"uuid": "r-4", "since": 2020}));
    }

    #[test]
    fn test_compile_reports_mapper_name() {
        let mut spec = city_spec();
        spec.index = Some("places-{".to_string());
        let err = MappingRuleSpec::Expression(spec).compile(EntityKind::Node, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplate { ref mapper, .. } if mapper == "cities"));

        let mut spec = city_spec();
        spec.name = None;
        spec.condition = "hasLabel(".to_string();
        let err = MappingRuleSpec::Expression(spec).compile(EntityKind::Node, 2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCondition { ref mapper, .. } if mapper == "node_mapping_2"));
    }

    #[test]
    fn test_spec_deserialize_tagged() {
        let rules: Vec<MappingRuleSpec> = serde_json::from_value(json!([
            {"mapper": "expression", "condition": "hasLabel('City')", "type": "city"},
            {"mapper": "passthrough", "name": "all"}
        ]))
        .unwrap();

        assert!(matches!(&rules[0], MappingRuleSpec::Expression(s) if s.doc_type.as_deref() == Some("city")));
        assert_eq!(rules[1].name(), Some("all"));
    }
}
