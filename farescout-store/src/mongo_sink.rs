//! MongoDB record sink.

use async_trait::async_trait;
use farescout_common::{CrawlError, Result};
use farescout_extract::{Record, RecordSink};
use mongodb::bson::{self, Document};
use mongodb::{Client, Collection};
use tracing::info;

/// Appends extracted records to one MongoDB collection.
pub struct MongoRecordSink {
    collection: Collection<Document>,
}

impl MongoRecordSink {
    pub async fn open(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|err| CrawlError::Store(err.to_string()))?;
        info!(database, collection, "connected to record sink");
        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }
}

#[async_trait]
impl RecordSink for MongoRecordSink {
    async fn persist(&self, records: &[Record]) -> Result<()> {
        // Zero extracted records is a legitimate crawl outcome, not an
        // insert of nothing.
        if records.is_empty() {
            info!("no records extracted; nothing to persist");
            return Ok(());
        }

        let documents = records
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| CrawlError::Store(err.to_string()))?;

        self.collection
            .insert_many(documents)
            .await
            .map_err(|err| CrawlError::Store(err.to_string()))?;
        info!(records = records.len(), "persisted extracted records");
        Ok(())
    }
}
