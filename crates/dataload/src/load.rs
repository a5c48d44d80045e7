//! Built-in loading step.

use crate::error::LoadError;
use crate::task::{DataLoadTask, LoadMetrics, StepMetrics};
use async_trait::async_trait;
use staging_core::{Mapping, MappingStep, Record, RecordSink, SubtaskOptions, TaskContext};
use staging_db::{id_table_name, StagingDatabase};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records sent to the sink per call.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Loading step that pushes staged rows to the org named in the task context.
pub struct LoadData {
    context: TaskContext,
    options: SubtaskOptions,
    chunk_size: usize,
}

/// Constructor matching [`crate::LoaderConstructor`].
pub fn load_data(context: TaskContext, options: SubtaskOptions) -> Box<dyn DataLoadTask> {
    Box::new(LoadData::new(context, options))
}

impl LoadData {
    pub fn new(context: TaskContext, options: SubtaskOptions) -> Self {
        Self {
            context,
            options,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the number of records sent per sink call.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn load_step(
        &self,
        db: &StagingDatabase,
        sink: &dyn RecordSink,
        step: &MappingStep,
    ) -> Result<StepMetrics, LoadError> {
        let columns: Vec<String> = step
            .staging_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = db.fetch_rows(&step.table, &columns).await?;

        let mut lookup_ids: HashMap<&str, HashMap<String, String>> = HashMap::new();
        for lookup in step.lookups.values() {
            if !lookup_ids.contains_key(lookup.table.as_str()) {
                let ids = db.id_mappings(&lookup.table).await?;
                lookup_ids.insert(lookup.table.as_str(), ids);
            }
        }

        let field_count = step.fields.len();
        let mut records = Vec::with_capacity(rows.len());
        let mut null_lookups = 0u64;

        for row in &rows {
            let mut record = Record::new();
            for ((sf_field, _), value) in step.fields.iter().zip(&row.values) {
                record.set(sf_field.as_str(), value.clone());
            }

            for ((sf_field, lookup), value) in
                step.lookups.iter().zip(&row.values[field_count..])
            {
                let resolved = match value {
                    None => {
                        null_lookups += 1;
                        None
                    }
                    Some(local_id) => {
                        let sf_id = lookup_ids
                            .get(lookup.table.as_str())
                            .and_then(|ids| ids.get(local_id))
                            .ok_or_else(|| LoadError::UnresolvedLookup {
                                step: step.name.clone(),
                                sf_field: sf_field.clone(),
                                table: lookup.table.clone(),
                                row_id: row.id,
                                local_id: local_id.clone(),
                            })?;
                        Some(sf_id.clone())
                    }
                };
                record.set(sf_field.as_str(), resolved);
            }

            records.push(record);
        }

        if null_lookups > 0 {
            warn!(
                "Step '{}': {} lookup values were null and load as empty references",
                step.name, null_lookups
            );
        }

        let mut loaded = 0u64;
        for (chunk_rows, chunk) in rows
            .chunks(self.chunk_size)
            .zip(records.chunks(self.chunk_size))
        {
            let sf_ids = sink.insert_records(&step.sf_object, chunk).await?;
            if sf_ids.len() != chunk.len() {
                return Err(LoadError::IdCountMismatch {
                    sf_object: step.sf_object.clone(),
                    sent: chunk.len(),
                    received: sf_ids.len(),
                });
            }

            let pairs: Vec<(String, String)> = chunk_rows
                .iter()
                .map(|row| row.id.to_string())
                .zip(sf_ids)
                .collect();
            loaded += db.append_id_mappings(&step.table, &pairs).await?;
            debug!(
                "Step '{}': loaded {} {} records",
                step.name,
                chunk.len(),
                step.sf_object
            );
        }

        // Empty steps still get an ID-mapping table so later lookups resolve.
        if rows.is_empty() {
            db.ensure_id_table(&step.table).await?;
        }

        Ok(StepMetrics {
            name: step.name.clone(),
            sf_object: step.sf_object.clone(),
            rows_loaded: loaded,
        })
    }
}

#[async_trait]
impl DataLoadTask for LoadData {
    async fn run(&mut self) -> Result<LoadMetrics, LoadError> {
        let start = Instant::now();
        let mapping_path = self
            .options
            .mapping
            .as_ref()
            .ok_or(LoadError::MissingMapping)?;
        let mapping = Mapping::from_file(self.context.resolve_path(mapping_path))?;

        let db = StagingDatabase::connect(&self.options.database_url).await?;

        if self.options.reset_oids {
            for step in &mapping.steps {
                db.drop_table(&id_table_name(&step.table)).await?;
            }
            debug!("Cleared ID-mapping tables for {} steps", mapping.steps.len());
        }

        let sink = self.context.org.sink().clone();
        let mut metrics = LoadMetrics::default();
        for step in &mapping.steps {
            let step_metrics = self.load_step(&db, sink.as_ref(), step).await?;
            info!(
                "Loaded {} rows from '{}' into {} on org '{}'",
                step_metrics.rows_loaded, step.table, step.sf_object, self.context.org.name
            );
            metrics.steps.push(step_metrics);
        }

        db.close().await;
        metrics.total_duration = start.elapsed();
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use staging_core::{OrgConfig, ProjectConfig};
    use staging_db::{sqlite_url, StagedRow};
    use std::sync::Arc;
    use tempfile::TempDir;

    const MAPPING: &str = r#"
steps:
  - name: Insert accounts
    sf_object: Account
    table: accounts
    fields:
      Name: name
  - name: Insert contacts
    sf_object: Contact
    table: contacts
    fields:
      LastName: last_name
    lookups:
      AccountId:
        table: accounts
        key_field: account_id
"#;

    struct Fixture {
        dir: TempDir,
        sink: Arc<MemorySink>,
        context: TaskContext,
        options: SubtaskOptions,
    }

    async fn fixture(accounts: &[(i64, &str)], contacts: &[(i64, &str, Option<&str>)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mapping.yml"), MAPPING).unwrap();
        let url = sqlite_url(&dir.path().join("staging.db"));

        let db = StagingDatabase::connect(&url).await.unwrap();
        let account_columns = vec!["name".to_string()];
        db.create_object_table("accounts", &account_columns)
            .await
            .unwrap();
        let rows: Vec<StagedRow> = accounts
            .iter()
            .map(|(id, name)| StagedRow::new(*id, vec![Some(name.to_string())]))
            .collect();
        db.insert_rows("accounts", &account_columns, &rows)
            .await
            .unwrap();

        let contact_columns = vec!["last_name".to_string(), "account_id".to_string()];
        db.create_object_table("contacts", &contact_columns)
            .await
            .unwrap();
        let rows: Vec<StagedRow> = contacts
            .iter()
            .map(|(id, name, account)| {
                StagedRow::new(
                    *id,
                    vec![Some(name.to_string()), account.map(str::to_string)],
                )
            })
            .collect();
        db.insert_rows("contacts", &contact_columns, &rows)
            .await
            .unwrap();
        db.close().await;

        let sink = Arc::new(MemorySink::new());
        let context = TaskContext::new(
            ProjectConfig::new("test", dir.path()),
            OrgConfig::new("memory", sink.clone()),
            "load",
        );
        let options = SubtaskOptions {
            mapping: Some(dir.path().join("mapping.yml")),
            database_url: url,
            working_directory: dir.path().to_path_buf(),
            ..Default::default()
        };

        Fixture {
            dir,
            sink,
            context,
            options,
        }
    }

    #[tokio::test]
    async fn test_loads_steps_and_resolves_lookups() {
        let f = fixture(
            &[(1, "Acme"), (2, "Globex")],
            &[(1, "Smith", Some("2")), (2, "Jones", None)],
        )
        .await;

        let metrics = LoadData::new(f.context, f.options.clone())
            .run()
            .await
            .unwrap();
        assert_eq!(metrics.rows_loaded(), 4);
        assert_eq!(metrics.steps[0].name, "Insert accounts");

        let accounts = f.sink.records("Account").await;
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].get("Name"), Some("Globex"));

        let db = StagingDatabase::connect(&f.options.database_url)
            .await
            .unwrap();
        let account_ids = db.id_mappings("accounts").await.unwrap();
        let contact_ids = db.id_mappings("contacts").await.unwrap();
        assert_eq!(account_ids.len(), 2);
        assert_eq!(contact_ids.len(), 2);
        db.close().await;

        let contacts = f.sink.records("Contact").await;
        assert_eq!(contacts[0].get("AccountId"), account_ids.get("2").map(String::as_str));
        assert_eq!(contacts[1].get("AccountId"), None);
        drop(f.dir);
    }

    #[tokio::test]
    async fn test_unresolved_lookup() {
        let f = fixture(&[(1, "Acme")], &[(1, "Smith", Some("9"))]).await;

        let result = LoadData::new(f.context, f.options).run().await;
        match result {
            Err(LoadError::UnresolvedLookup {
                table, local_id, ..
            }) => {
                assert_eq!(table, "accounts");
                assert_eq!(local_id, "9");
            }
            other => panic!("Expected UnresolvedLookup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_mapping() {
        let f = fixture(&[], &[]).await;
        let options = SubtaskOptions {
            mapping: None,
            ..f.options
        };

        let result = LoadData::new(f.context, options).run().await;
        assert!(matches!(result, Err(LoadError::MissingMapping)));
    }

    #[tokio::test]
    async fn test_chunks_and_empty_steps() {
        let accounts: Vec<(i64, &str)> = (1..=5).map(|i| (i, "Acme")).collect();
        let f = fixture(&accounts, &[]).await;

        let metrics = LoadData::new(f.context, f.options.clone())
            .with_chunk_size(2)
            .run()
            .await
            .unwrap();
        assert_eq!(metrics.steps[0].rows_loaded, 5);
        assert_eq!(metrics.steps[1].rows_loaded, 0);
        assert_eq!(f.sink.insert_calls().await, 3);

        let db = StagingDatabase::connect(&f.options.database_url)
            .await
            .unwrap();
        assert!(db.table_exists("contacts_sf_ids").await.unwrap());
        db.close().await;
    }

    #[tokio::test]
    async fn test_reset_oids_clears_id_tables() {
        let f = fixture(&[(1, "Acme")], &[]).await;
        let db = StagingDatabase::connect(&f.options.database_url)
            .await
            .unwrap();
        db.append_id_mappings("accounts", &[("7".to_string(), "old".to_string())])
            .await
            .unwrap();
        db.close().await;

        let options = SubtaskOptions {
            reset_oids: true,
            ..f.options.clone()
        };
        LoadData::new(f.context, options).run().await.unwrap();

        let db = StagingDatabase::connect(&f.options.database_url)
            .await
            .unwrap();
        let ids = db.id_mappings("accounts").await.unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains_key("1"));
        db.close().await;
    }

    #[tokio::test]
    async fn test_missing_table() {
        let f = fixture(&[], &[]).await;
        let db = StagingDatabase::connect(&f.options.database_url)
            .await
            .unwrap();
        db.drop_table("contacts").await.unwrap();
        db.close().await;

        let result = LoadData::new(f.context, f.options).run().await;
        assert!(matches!(
            result,
            Err(LoadError::Staging(staging_db::StagingError::TableNotFound(_)))
        ));
    }
}
