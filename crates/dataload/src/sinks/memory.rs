//! In-memory record sink.

use super::external_id;
use async_trait::async_trait;
use staging_core::{Record, RecordSink, SinkError};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryOrg {
    records: HashMap<String, Vec<(String, Record)>>,
    insert_calls: usize,
}

/// Sink that keeps inserted records in memory. Used for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    org: Mutex<MemoryOrg>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records inserted into `sf_object`, in insertion order.
    pub async fn records(&self, sf_object: &str) -> Vec<Record> {
        let org = self.org.lock().await;
        org.records
            .get(sf_object)
            .map(|records| records.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }

    /// External ids assigned in `sf_object`, in insertion order.
    pub async fn ids(&self, sf_object: &str) -> Vec<String> {
        let org = self.org.lock().await;
        org.records
            .get(sf_object)
            .map(|records| records.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    /// Total records across all objects.
    pub async fn total_records(&self) -> usize {
        self.org.lock().await.records.values().map(Vec::len).sum()
    }

    /// Number of `insert_records` calls received.
    pub async fn insert_calls(&self) -> usize {
        self.org.lock().await.insert_calls
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert_records(
        &self,
        sf_object: &str,
        records: &[Record],
    ) -> Result<Vec<String>, SinkError> {
        let mut org = self.org.lock().await;
        org.insert_calls += 1;

        let stored = org.records.entry(sf_object.to_string()).or_default();
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let id = external_id(sf_object, stored.len() as u64 + 1);
            stored.push((id.clone(), record.clone()));
            ids.push(id);
        }
        Ok(ids)
    }
}
