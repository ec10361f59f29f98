//! Placeholder substitution over step attributes.

use std::sync::OnceLock;

use farescout_schema::AttributeValue;
use regex::{Captures, Regex};
use tracing::warn;

use crate::context::RuntimeContext;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern"))
}

/// Substitute `{{key}}` markers with runtime values, recursing through
/// mapping and sequence nodes. Every mapping entry (e.g. an `element`
/// selector next to a `value` payload) is resolved independently.
///
/// A key absent from the context resolves to the empty string and is
/// recorded as a warning; resolution never fails a step on its own. Since
/// resolved text contains no residual markers, applying this twice is a
/// no-op.
pub fn resolve(value: &AttributeValue, ctx: &RuntimeContext) -> AttributeValue {
    match value {
        AttributeValue::Scalar(text) => AttributeValue::Scalar(resolve_text(text, ctx)),
        AttributeValue::Sequence(items) => {
            AttributeValue::Sequence(items.iter().map(|v| resolve(v, ctx)).collect())
        }
        AttributeValue::Mapping(map) => AttributeValue::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, ctx)))
                .collect(),
        ),
    }
}

fn resolve_text(text: &str, ctx: &RuntimeContext) -> String {
    placeholder_re()
        .replace_all(text, |caps: &Captures| {
            let key = caps[1].trim();
            match ctx.get(key) {
                Some(value) => value.to_string(),
                None => {
                    warn!(key, "placeholder has no runtime value; substituting empty string");
                    String::new()
                }
            }
        })
        .into_owned()
}
