//! In-memory [`SampleStore`] for tests and runs without a database.

use std::sync::RwLock;

use async_trait::async_trait;
use indexmap::IndexMap;

use super::{new_id, SampleStore};
use crate::error::{Error, Result};
use crate::record::{SampleFilter, SampleRecord, StoredSample};

/// Samples keyed by `source_url`, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: RwLock<IndexMap<String, StoredSample>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::Persistence("memory store lock poisoned".to_string())
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn upsert(&self, record: &SampleRecord) -> Result<String> {
        let mut samples = self.samples.write().map_err(|_| poisoned())?;
        let entry = samples
            .entry(record.source_url.clone())
            .or_insert_with(|| StoredSample {
                id: new_id(),
                record: record.clone(),
            });
        entry.record = record.clone();
        Ok(entry.id.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredSample>> {
        let samples = self.samples.read().map_err(|_| poisoned())?;
        Ok(samples.values().find(|s| s.id == id).cloned())
    }

    async fn list(&self, filter: &SampleFilter, limit: usize) -> Result<Vec<StoredSample>> {
        let samples = self.samples.read().map_err(|_| poisoned())?;
        Ok(samples
            .values()
            .filter(|s| filter.matches(&s.record))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &SampleFilter) -> Result<u64> {
        let samples = self.samples.read().map_err(|_| poisoned())?;
        let n = samples.values().filter(|s| filter.matches(&s.record)).count();
        Ok(n as u64)
    }
}
