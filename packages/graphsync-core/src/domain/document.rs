//! Document targets and backend actions
//!
//! The triple (index, type, id) identifies a document in the search
//! backend. The (index, type) pair alone is its [`DocumentLocation`], which
//! is what update reconciliation keys on.
//!
//! Two mappers producing the same triple for one entity is a configuration
//! error. It is not rejected here; the second upsert simply overwrites the
//! first in the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a document lives, independent of its id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl DocumentLocation {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.doc_type)
    }
}

/// Fully resolved document address, without payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentTarget {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,
}

impl DocumentTarget {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    pub fn location(&self) -> DocumentLocation {
        DocumentLocation::new(self.index.clone(), self.doc_type.clone())
    }

    pub fn into_delete(self) -> Action {
        Action::Delete {
            index: self.index,
            doc_type: self.doc_type,
            id: self.id,
        }
    }
}

impl fmt::Display for DocumentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.doc_type, self.id)
    }
}

/// One resolved document produced by a mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRepresentation {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    /// Serialized document body (JSON)
    pub payload: Vec<u8>,
}

impl DocumentRepresentation {
    pub fn new(target: DocumentTarget, payload: Vec<u8>) -> Self {
        Self {
            index: target.index,
            doc_type: target.doc_type,
            id: target.id,
            payload,
        }
    }

    pub fn location(&self) -> DocumentLocation {
        DocumentLocation::new(self.index.clone(), self.doc_type.clone())
    }

    pub fn target(&self) -> DocumentTarget {
        DocumentTarget::new(self.index.clone(), self.doc_type.clone(), self.id.clone())
    }

    pub fn into_upsert(self) -> Action {
        Action::Upsert {
            index: self.index,
            doc_type: self.doc_type,
            id: self.id,
            payload: self.payload,
        }
    }
}

/// Write operation for the bulk transport
///
/// Both variants are idempotent on the backend: an upsert replaces the
/// document, and deleting a missing document is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Upsert {
        index: String,
        #[serde(rename = "type")]
        doc_type: String,
        id: String,
        payload: Vec<u8>,
    },
    Delete {
        index: String,
        #[serde(rename = "type")]
        doc_type: String,
        id: String,
    },
}

impl Action {
    pub fn upsert(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Action::Upsert {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            payload,
        }
    }

    pub fn delete(index: impl Into<String>, doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Action::Delete {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    pub fn index(&self) -> &str {
        match self {
            Action::Upsert { index, .. } | Action::Delete { index, .. } => index,
        }
    }

    pub fn doc_type(&self) -> &str {
        match self {
            Action::Upsert { doc_type, .. } | Action::Delete { doc_type, .. } => doc_type,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Action::Upsert { id, .. } | Action::Delete { id, .. } => id,
        }
    }

    pub fn location(&self) -> DocumentLocation {
        DocumentLocation::new(self.index(), self.doc_type())
    }

    pub fn is_upsert(&self) -> bool {
        matches!(self, Action::Upsert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Action::Delete { .. })
    }

    /// Payload for upserts
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Action::Upsert { payload, .. } => Some(payload),
            Action::Delete { .. } => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upsert { index, doc_type, id, payload } => {
                write!(f, "upsert {}/{}/{} ({} bytes)", index, doc_type, id, payload.len())
            }
            Action::Delete { index, doc_type, id } => write!(f, "delete {}/{}/{}", index, doc_type, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representation_into_upsert() {
        let doc = DocumentRepresentation::new(
            DocumentTarget::new("people", "person", "42"),
            br#"{"uid":"42"}"#.to_vec(),
        );
        assert_eq!(doc.location(), DocumentLocation::new("people", "person"));

        let action = doc.into_upsert();
        assert!(action.is_upsert());
        assert_eq!(action.id(), "42");
        assert_eq!(action.payload(), Some(&br#"{"uid":"42"}"#[..]));
    }

    #[test]
    fn test_target_into_delete() {
        let action = DocumentTarget::new("places", "city", "Paris").into_delete();
        assert_eq!(action, Action::delete("places", "city", "Paris"));
        assert!(action.payload().is_none());
        assert_eq!(action.location().to_string(), "places/city");
    }

    #[test]
    fn test_action_display() {
        let upsert = Action::upsert("people", "person", "42", vec![1, 2, 3]);
        assert_eq!(upsert.to_string(), "upsert people/person/42 (3 bytes)");

        let delete = Action::delete("people", "person", "42");
        assert_eq!(delete.to_string(), "delete people/person/42");
    }

    #[test]
    fn test_action_serde_uses_type_field() {
        let json = serde_json::to_value(Action::delete("people", "person", "1")).unwrap();
        assert_eq!(json["action"], "delete");
        assert_eq!(json["type"], "person");
    }
}
