//! Fetch and validate a step schema before any browser work begins.

use async_trait::async_trait;
use farescout_common::{CrawlError, Result};
use tracing::{debug, info};

use crate::types::StepSchema;

/// Key→blob configuration store collaborator.
///
/// Implementations own their connection lifecycle; the loader only reads.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the raw schema blob for a crawler key. `Ok(None)` means the
    /// store is healthy but has no entry for the key.
    async fn fetch(&self, key: &str) -> Result<Option<String>>;
}

/// Turns an opaque crawler key into a validated [`StepSchema`].
pub struct SchemaLoader<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> SchemaLoader<'a> {
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Fetch and parse the schema for `key`.
    ///
    /// Fails with [`CrawlError::ConfigNotFound`] when the store has no entry
    /// and [`CrawlError::ConfigParse`] when the blob is malformed or its
    /// `main` phase is empty. Either failure aborts crawl construction.
    pub async fn load(&self, key: &str) -> Result<StepSchema> {
        debug!(crawler = key, "fetching step schema");
        let blob = self
            .store
            .fetch(key)
            .await?
            .ok_or_else(|| CrawlError::ConfigNotFound(key.to_string()))?;

        let schema: StepSchema = serde_json::from_str(&blob)
            .map_err(|e| CrawlError::ConfigParse(format!("key '{key}': {e}")))?;

        if schema.script.main.is_empty() {
            return Err(CrawlError::ConfigParse(format!(
                "key '{key}': script.main must contain at least one step"
            )));
        }

        info!(
            crawler = key,
            before = schema.script.before.len(),
            main = schema.script.main.len(),
            after = schema.script.after.len(),
            "step schema loaded"
        );
        Ok(schema)
    }
}
