//! Extracted record model and the persistence collaborator.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One extracted field. Multiplicity is derived solely from match count at
/// read time: 0 matches → `Null`, 1 → `Scalar`, more → `Many` in document
/// order. `Error` is the field-local sentinel for a failed path evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Scalar(String),
    Many(Vec<String>),
    Error(String),
}

impl FieldValue {
    /// True for values that carry extracted content (not null, not error).
    pub fn is_concrete(&self) -> bool {
        matches!(self, FieldValue::Scalar(_) | FieldValue::Many(_))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Scalar(v) => serializer.serialize_str(v),
            FieldValue::Many(vs) => vs.serialize(serializer),
            FieldValue::Error(msg) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("extraction_error", msg)?;
                map.end()
            }
        }
    }
}

/// One extracted row: field name → value, in schema declaration order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// A record is worth keeping iff at least one field holds a non-null,
    /// non-error value.
    pub fn has_concrete_value(&self) -> bool {
        self.fields.values().any(FieldValue::is_concrete)
    }
}

/// Persistence collaborator: accepts the session's record set for durable
/// storage. Implementations report failure through the `Result`; they never
/// panic past this boundary.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn persist(&self, records: &[Record]) -> farescout_common::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_detection_ignores_nulls_and_errors() {
        let mut record = Record::default();
        record.insert("a", FieldValue::Null);
        record.insert("b", FieldValue::Error("bad path".into()));
        assert!(!record.has_concrete_value());

        record.insert("c", FieldValue::Scalar("100".into()));
        assert!(record.has_concrete_value());
    }

    #[test]
    fn serializes_each_multiplicity_distinctly() {
        let mut record = Record::default();
        record.insert("none", FieldValue::Null);
        record.insert("one", FieldValue::Scalar("x".into()));
        record.insert("many", FieldValue::Many(vec!["a".into(), "b".into()]));
        record.insert("bad", FieldValue::Error("boom".into()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "none": null,
                "one": "x",
                "many": ["a", "b"],
                "bad": {"extraction_error": "boom"}
            })
        );
    }
}
