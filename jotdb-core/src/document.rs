// src/document.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Name of the identifier field carried by every stored document.
pub const ID_FIELD: &str = "_id";

/// Document identifier assigned by the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    String(String),
}

impl DocumentId {
    /// Generate a fresh object identifier (UUID v4, hex form).
    pub fn new_object_id() -> Self {
        DocumentId::String(Uuid::new_v4().simple().to_string())
    }

    /// Identifier as a JSON value, the form it takes inside a document.
    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::Int(i) => Value::from(*i),
            DocumentId::String(s) => Value::String(s.clone()),
        }
    }

    /// Parse an identifier out of a JSON value. Only integers and strings
    /// are valid identifier types.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(DocumentId::Int),
            Value::String(s) => Some(DocumentId::String(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentId::Int(i) => write!(f, "{}", i),
            DocumentId::String(s) => write!(f, "{}", s),
        }
    }
}

/// Read the identifier of a document, if it carries one.
pub fn id_of(doc: &Value) -> Option<DocumentId> {
    doc.get(ID_FIELD).and_then(DocumentId::from_value)
}

/// Write `id` into the identifier field of `doc` in place. Non-object
/// documents are left untouched.
pub fn assign_id(doc: &mut Value, id: &DocumentId) {
    if let Value::Object(map) = doc {
        map.insert(ID_FIELD.to_string(), id.to_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id_shape() {
        let id = DocumentId::new_object_id();
        match id {
            DocumentId::String(s) => {
                assert_eq!(s.len(), 32); // simple UUID, no dashes
                assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
            }
            _ => panic!("Expected String variant"),
        }
    }

    #[test]
    fn test_id_value_roundtrip() {
        let int_id = DocumentId::Int(42);
        assert_eq!(DocumentId::from_value(&int_id.to_value()), Some(int_id));

        let str_id = DocumentId::String("abc123".into());
        assert_eq!(DocumentId::from_value(&str_id.to_value()), Some(str_id));

        assert_eq!(DocumentId::from_value(&json!({"nested": 1})), None);
        assert_eq!(DocumentId::from_value(&json!(1.5)), None);
    }

    #[test]
    fn test_id_of_and_assign() {
        let mut doc = json!({"name": "Alice"});
        assert_eq!(id_of(&doc), None);

        let id = DocumentId::Int(7);
        assign_id(&mut doc, &id);
        assert_eq!(id_of(&doc), Some(id));
        assert_eq!(doc["_id"], json!(7));
    }

    #[test]
    fn test_assign_ignores_non_objects() {
        let mut doc = json!("not an object");
        assign_id(&mut doc, &DocumentId::Int(1));
        assert_eq!(doc, json!("not an object"));
    }

    #[test]
    fn test_untagged_serialization() {
        let doc = json!({"_id": 42, "name": "Frank"});
        assert_eq!(id_of(&doc), Some(DocumentId::Int(42)));

        let doc = json!({"_id": "abc", "name": "Grace"});
        assert_eq!(id_of(&doc), Some(DocumentId::String("abc".into())));
    }
}
