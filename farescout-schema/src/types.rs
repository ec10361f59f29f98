//! Typed shape of the step-schema blob.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A step attribute: an arbitrarily nested tree of scalars, sequences and
/// mappings. This is the surface the placeholder resolver recurses over.
///
/// Numbers and booleans on the wire are folded into [`AttributeValue::Scalar`]
/// text; the interpreter only ever consumes attribute leaves as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    Sequence(Vec<AttributeValue>),
    Mapping(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    /// The scalar text of a leaf node, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        match self {
            AttributeValue::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Convenience for the common `{ element, value }` mapping shape:
    /// the scalar under `key`, if present.
    pub fn str_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttributeValue::Scalar(String::new()),
            Value::Bool(b) => AttributeValue::Scalar(b.to_string()),
            Value::Number(n) => AttributeValue::Scalar(n.to_string()),
            Value::String(s) => AttributeValue::Scalar(s),
            Value::Array(items) => {
                AttributeValue::Sequence(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => AttributeValue::Mapping(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?.into())
    }
}

/// One `{ action, att }` pair within a phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Wire action identifier; mapped to the closed action set at dispatch.
    pub action: String,
    pub att: AttributeValue,
}

/// Ordered mapping of step-name → step. Execution order is derived from the
/// step names, not from the map's native order.
pub type StepGroup = IndexMap<String, StepDefinition>;

/// The three phases of a crawl script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub before: StepGroup,
    #[serde(default)]
    pub main: StepGroup,
    #[serde(default)]
    pub after: StepGroup,
}

/// Declarative extraction rules for the page reached after `main`.
///
/// `result_single` is declared in every observed schema revision but has no
/// implemented semantics; the extraction engine surfaces it as an explicit
/// "not supported" outcome rather than guessing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionRules {
    #[serde(default)]
    pub result_group: Option<GroupRule>,
    #[serde(default)]
    pub result_single: Option<Value>,
}

/// Container-level extraction rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRule {
    /// XPath selecting the container nodes.
    #[serde(rename = "tag")]
    pub container: String,
    pub items: ItemsRule,
}

/// Item drill-down within each container plus the per-item fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsRule {
    /// Relative XPath from the container to each item node. Some container
    /// queries return wrapper nodes that need this second drill-down.
    #[serde(rename = "tag", default = "default_item_path")]
    pub path: String,
    /// Field name → rule, in declaration order.
    pub elements: IndexMap<String, FieldRule>,
}

/// A single field rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    /// Relative XPath from the item node to the field's node(s).
    #[serde(rename = "tag")]
    pub path: String,
}

fn default_item_path() -> String {
    ".".to_string()
}

/// The whole schema blob: script plus extraction rules. Immutable once
/// loaded for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSchema {
    pub script: Script,
    #[serde(default)]
    pub tag: ExtractionRules,
}
