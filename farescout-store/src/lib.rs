//! External store integrations.
//!
//! Two collaborators live here: [`RedisConfigStore`], the key→blob source
//! behind the schema loader, and [`MongoRecordSink`], the durable sink for
//! extracted records. Both fold their client errors into
//! [`farescout_common::CrawlError::Store`] so callers stay backend-agnostic.

mod mongo_sink;
mod redis_store;

pub use mongo_sink::MongoRecordSink;
pub use redis_store::RedisConfigStore;
