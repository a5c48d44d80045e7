//! Directory-backed record sink.
//!
//! Each external object gets a `<sf_object>.jsonl` file in the org directory;
//! every inserted record becomes one JSON line carrying its assigned `Id`.
//! Ids keep counting from the number of lines already in the file, so
//! repeated runs against the same directory never reuse an id. The file is
//! counted once per object; later inserts use the sink's own counter.

use super::external_id;
use async_trait::async_trait;
use serde_json::{Map, Value};
use staging_core::{Record, RecordSink, SinkError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Sink that appends records to JSON Lines files in a directory.
#[derive(Debug)]
pub struct LocalOrgSink {
    dir: PathBuf,
    /// Records written so far per object, guarding all file writes
    counters: Mutex<HashMap<String, u64>>,
}

impl LocalOrgSink {
    /// Create a sink writing into `dir`. The directory is created on first
    /// insert.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Org directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File records of `sf_object` are written to.
    pub fn object_file(&self, sf_object: &str) -> PathBuf {
        self.dir.join(format!("{sf_object}.jsonl"))
    }
}

async fn existing_records(path: &Path) -> Result<u64, SinkError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content.lines().filter(|l| !l.trim().is_empty()).count() as u64),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl RecordSink for LocalOrgSink {
    async fn insert_records(
        &self,
        sf_object: &str,
        records: &[Record],
    ) -> Result<Vec<String>, SinkError> {
        if sf_object.is_empty() || sf_object.contains(['/', '\\']) {
            return Err(SinkError::Rejected {
                sf_object: sf_object.to_string(),
                reason: "invalid object name".to_string(),
            });
        }

        let mut counters = self.counters.lock().await;
        fs::create_dir_all(&self.dir).await?;

        let path = self.object_file(sf_object);
        let existing = match counters.get(sf_object) {
            Some(count) => *count,
            None => existing_records(&path).await?,
        };

        let mut ids = Vec::with_capacity(records.len());
        let mut buffer = String::new();
        for (offset, record) in records.iter().enumerate() {
            let id = external_id(sf_object, existing + offset as u64 + 1);

            let mut line = Map::new();
            line.insert("Id".to_string(), Value::String(id.clone()));
            for (field, value) in &record.fields {
                let value = value.clone().map(Value::String).unwrap_or(Value::Null);
                line.insert(field.clone(), value);
            }
            buffer.push_str(&serde_json::to_string(&Value::Object(line))?);
            buffer.push('\n');
            ids.push(id);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;

        counters.insert(sf_object.to_string(), existing + records.len() as u64);
        Ok(ids)
    }
}
