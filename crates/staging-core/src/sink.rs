//! Record sink trait definition.
//!
//! The sink is the client for the external system records are loaded into.
//! The loading step only ever talks to this trait, so the same load logic
//! works against a directory-backed org, an in-memory org in tests, or a
//! real API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record ready to be sent to the external system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// External field name -> value (`None` for null)
    pub fields: BTreeMap<String, Option<String>>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.insert(field.into(), value);
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }
}

/// Errors raised by a record sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The external system refused the records.
    #[error("{sf_object} records rejected: {reason}")]
    Rejected { sf_object: String, reason: String },
}

/// Trait for writing records to the external system.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Insert records into `sf_object`.
    ///
    /// Returns the external id assigned to each record, in input order.
    async fn insert_records(
        &self,
        sf_object: &str,
        records: &[Record],
    ) -> Result<Vec<String>, SinkError>;
}
