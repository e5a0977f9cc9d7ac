//! Persistence of parsed samples.
//!
//! The [`SampleStore`] trait is the storage boundary: records go in keyed by
//! their `source_url`, so re-scraping a page replaces the earlier record
//! instead of adding a second one. Ids are assigned on first insert and stay
//! stable across later upserts.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`upsert`](SampleStore::upsert) | Insert or replace a record by `source_url` |
//! | [`upsert_many`](SampleStore::upsert_many) | Upsert a batch of records |
//! | [`get_by_id`](SampleStore::get_by_id) | Fetch one stored sample |
//! | [`list`](SampleStore::list) | Samples matching a filter, oldest first |
//! | [`count`](SampleStore::count) | Number of samples matching a filter |

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{SampleFilter, SampleRecord, StoredSample};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Abstract storage backend for samples.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Insert or replace the record sharing `record.source_url`.
    ///
    /// Returns the id of the stored sample.
    async fn upsert(&self, record: &SampleRecord) -> Result<String>;

    /// Upsert several records, returning their ids in input order.
    async fn upsert_many(&self, records: &[SampleRecord]) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(self.upsert(record).await?);
        }
        Ok(ids)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredSample>>;

    /// At most `limit` samples matching `filter`, in insertion order.
    async fn list(&self, filter: &SampleFilter, limit: usize) -> Result<Vec<StoredSample>>;

    async fn count(&self, filter: &SampleFilter) -> Result<u64>;
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
