//! Redis-backed crawler configuration store.

use async_trait::async_trait;
use farescout_common::{CrawlError, Result};
use farescout_schema::ConfigStore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

/// Fetches schema blobs from Redis, one string value per crawler key.
///
/// The connection manager reconnects on its own; a dead server surfaces as
/// a `Store` error on the next fetch rather than a poisoned handle.
pub struct RedisConfigStore {
    conn: ConnectionManager,
}

impl RedisConfigStore {
    /// Connect and verify the server answers before handing the store out.
    pub async fn open(url: &str) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|err| CrawlError::Store(err.to_string()))?;
        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|err| CrawlError::Store(err.to_string()))?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|err| CrawlError::Store(format!("redis ping failed: {err}")))?;
        info!(url, "connected to configuration store");

        Ok(Self { conn })
    }
}

#[async_trait]
impl ConfigStore for RedisConfigStore {
    async fn fetch(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let blob: Option<String> = conn
            .get(key)
            .await
            .map_err(|err| CrawlError::Store(err.to_string()))?;
        debug!(key, found = blob.is_some(), "configuration lookup");
        Ok(blob)
    }
}
