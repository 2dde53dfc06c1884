//! Snapshot builders

use graphsync_core::{EntitySnapshot, NodeSnapshot, RelationshipSnapshot};

/// Node with the given labels and string properties
pub fn node(id: u64, labels: &[&str], properties: &[(&str, &str)]) -> EntitySnapshot {
    let node = labels
        .iter()
        .fold(NodeSnapshot::new(id), |node, label| node.with_label(*label));
    properties
        .iter()
        .fold(node, |node, (name, value)| node.with_property(*name, *value))
        .into()
}

/// Relationship with the given type and string properties
pub fn relationship(id: u64, rel_type: &str, properties: &[(&str, &str)]) -> EntitySnapshot {
    properties
        .iter()
        .fold(RelationshipSnapshot::new(id, rel_type, 1, 2), |rel, (name, value)| {
            rel.with_property(*name, *value)
        })
        .into()
}
