//! Entity snapshots
//!
//! Immutable, point-in-time views of graph nodes and relationships as
//! handed over by the change-event source. The engine only reads them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Entity properties (ordered so payloads are deterministic)
pub type PropertyMap = BTreeMap<String, Value>;

/// Graph entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Relationship,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node snapshot
///
/// # Examples
///
/// ```rust
/// use graphsync_core::domain::NodeSnapshot;
///
/// let node = NodeSnapshot::new(1)
///     .with_label("Person")
///     .with_property("uid", "42");
/// assert!(node.has_label("Person"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Graph identity
    pub id: u64,
    /// Labels in graph order
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl NodeSnapshot {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            labels: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Relationship snapshot
///
/// Start and end node references are carried through but not used for
/// mapping decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub id: u64,
    /// Relationship type (e.g. `WORKS_AT`)
    pub rel_type: String,
    pub start_node: u64,
    pub end_node: u64,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl RelationshipSnapshot {
    pub fn new(id: u64, rel_type: impl Into<String>, start_node: u64, end_node: u64) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            start_node,
            end_node,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Point-in-time view of a graph entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntitySnapshot {
    Node(NodeSnapshot),
    Relationship(RelationshipSnapshot),
}

impl EntitySnapshot {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntitySnapshot::Node(_) => EntityKind::Node,
            EntitySnapshot::Relationship(_) => EntityKind::Relationship,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            EntitySnapshot::Node(node) => node.id,
            EntitySnapshot::Relationship(rel) => rel.id,
        }
    }

    /// Node labels; empty for relationships
    pub fn labels(&self) -> &[String] {
        match self {
            EntitySnapshot::Node(node) => &node.labels,
            EntitySnapshot::Relationship(_) => &[],
        }
    }

    /// Relationship type; `None` for nodes
    pub fn rel_type(&self) -> Option<&str> {
        match self {
            EntitySnapshot::Node(_) => None,
            EntitySnapshot::Relationship(rel) => Some(&rel.rel_type),
        }
    }

    /// First label for nodes, type for relationships
    pub fn primary_label(&self) -> Option<&str> {
        match self {
            EntitySnapshot::Node(node) => node.labels.first().map(String::as_str),
            EntitySnapshot::Relationship(rel) => Some(&rel.rel_type),
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        match self {
            EntitySnapshot::Node(node) => node.has_label(label),
            EntitySnapshot::Relationship(_) => false,
        }
    }

    pub fn properties(&self) -> &PropertyMap {
        match self {
            EntitySnapshot::Node(node) => &node.properties,
            EntitySnapshot::Relationship(rel) => &rel.properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties().get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties().contains_key(name)
    }
}

impl From<NodeSnapshot> for EntitySnapshot {
    fn from(node: NodeSnapshot) -> Self {
        EntitySnapshot::Node(node)
    }
}

impl From<RelationshipSnapshot> for EntitySnapshot {
    fn from(rel: RelationshipSnapshot) -> Self {
        EntitySnapshot::Relationship(rel)
    }
}

/// Short identity used in log lines: `node#42:Person:City`, `relationship#7:WORKS_AT`
impl fmt::Display for EntitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntitySnapshot::Node(node) => {
                write!(f, "node#{}", node.id)?;
                for label in &node.labels {
                    write!(f, ":{}", label)?;
                }
                Ok(())
            }
            EntitySnapshot::Relationship(rel) => {
                write!(f, "relationship#{}:{}", rel.id, rel.rel_type)
            }
        }
    }
}
