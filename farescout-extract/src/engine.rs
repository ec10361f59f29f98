//! Projection of a captured page into records.

use farescout_common::{CrawlError, Result};
use farescout_schema::ExtractionRules;
use tracing::{debug, warn};

use crate::record::{FieldValue, Record};
use crate::xpath::{PageTree, XPathError, XPathExpr};

/// Apply the schema's extraction rules to a captured page.
///
/// Only `result_group` has semantics. A schema declaring `result_single`
/// alone is surfaced as an explicit unsupported-rule error; when both are
/// declared the single branch is ignored with a warning. Failures below the
/// rule level are contained per field as [`FieldValue::Error`] sentinels.
pub fn extract(tree: &PageTree, rules: &ExtractionRules) -> Result<Vec<Record>> {
    if rules.result_single.is_some() {
        if rules.result_group.is_none() {
            return Err(CrawlError::Extraction(
                "result_single rules are not supported".into(),
            ));
        }
        warn!("result_single rules are not supported; using result_group");
    }

    let group = rules.result_group.as_ref().ok_or_else(|| {
        CrawlError::Extraction("schema declares no extraction rules".into())
    })?;

    let container_expr = XPathExpr::parse(&group.container)
        .map_err(|e| CrawlError::Extraction(format!("container path: {e}")))?;
    let item_expr = XPathExpr::parse(&group.items.path)
        .map_err(|e| CrawlError::Extraction(format!("item path: {e}")))?;

    // Field paths are parsed once; a malformed path poisons only that field.
    let field_exprs: Vec<(&str, std::result::Result<XPathExpr, XPathError>)> = group
        .items
        .elements
        .iter()
        .map(|(name, rule)| (name.as_str(), XPathExpr::parse(&rule.path)))
        .collect();

    let containers = tree.evaluate(&container_expr, tree.root_id());
    debug!(containers = containers.len(), "container path evaluated");

    let mut records = Vec::new();
    let mut discarded = 0usize;
    for container in containers {
        for item in tree.evaluate(&item_expr, container) {
            let mut record = Record::default();
            for (name, expr) in &field_exprs {
                let value = match expr {
                    Err(e) => FieldValue::Error(e.to_string()),
                    Ok(expr) => {
                        let mut texts: Vec<String> = tree
                            .evaluate(expr, item)
                            .into_iter()
                            .map(|id| tree.text_content(id).trim().to_string())
                            .collect();
                        match texts.len() {
                            0 => FieldValue::Null,
                            1 => FieldValue::Scalar(texts.remove(0)),
                            _ => FieldValue::Many(texts),
                        }
                    }
                };
                record.insert(*name, value);
            }
            if record.has_concrete_value() {
                records.push(record);
            } else {
                discarded += 1;
            }
        }
    }

    debug!(kept = records.len(), discarded, "extraction finished");
    Ok(records)
}
