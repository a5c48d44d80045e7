//! Built-in schema-driven generation step.

use crate::error::GenerationError;
use crate::generators::{generate_value, GeneratedIds};
use crate::schema::{GeneratorSchema, GeneratorTable};
use crate::task::{DataGenerationTask, GenerationMetrics};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use staging_core::{SubtaskOptions, TaskContext};
use staging_db::{StagedRow, StagingDatabase};
use std::time::Instant;
use tracing::{debug, info};

/// Derive the seed for one batch (or one table within it) from a base seed.
pub fn batch_seed(seed: u64, batch: u64) -> u64 {
    seed.wrapping_add(batch.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Generates rows for the tables of one batch.
///
/// Tables must be generated in schema order: reference fields pick among the
/// ids generated for earlier tables.
pub struct RowGenerator {
    seed: u64,
    generated: GeneratedIds,
}

impl RowGenerator {
    /// Create a generator for a batch seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            generated: GeneratedIds::new(),
        }
    }

    /// Generate `count` rows for `table` with ids starting at `first_id`.
    ///
    /// `position` is the table's index in the schema; each table draws from its
    /// own RNG so adding a field to one table leaves the others unchanged.
    pub fn generate_rows(
        &mut self,
        position: usize,
        table: &GeneratorTable,
        first_id: i64,
        count: u64,
    ) -> Vec<StagedRow> {
        let mut rng = StdRng::seed_from_u64(batch_seed(self.seed, position as u64));
        let mut rows = Vec::with_capacity(count as usize);

        for offset in 0..count as i64 {
            let id = first_id + offset;
            let index = (id - 1).max(0) as u64;
            let values = table
                .fields
                .iter()
                .map(|field| {
                    generate_value(&field.generator, &mut rng, index, &self.generated)
                        .into_staged_text()
                })
                .collect();
            rows.push(StagedRow::new(id, values));
        }

        self.generated
            .insert(table.name.clone(), first_id..first_id + count as i64);
        rows
    }
}

/// Generation step that fills the staging database from a generator schema.
///
/// Options read from `data_generation_options`:
/// - `schema` (required): path of the generator schema YAML
/// - `seed`: base seed, overriding the schema's
pub struct SchemaDataGenerator {
    context: TaskContext,
    options: SubtaskOptions,
}

impl SchemaDataGenerator {
    pub fn new(context: TaskContext, options: SubtaskOptions) -> Self {
        Self { context, options }
    }

    fn load_schema(&self) -> Result<GeneratorSchema, GenerationError> {
        let path = self
            .options
            .data_generation_option("schema")
            .ok_or(GenerationError::MissingOption("schema"))?;
        let path = self.context.resolve_path(path);
        debug!("Loading generator schema from {}", path.display());
        Ok(GeneratorSchema::from_file(&path)?)
    }

    fn base_seed(&self, schema: &GeneratorSchema) -> Result<u64, GenerationError> {
        match self.options.data_generation_option("seed") {
            Some(value) => value
                .parse()
                .map_err(|_| GenerationError::InvalidOption {
                    name: "seed",
                    value,
                }),
            None => Ok(schema.seed.unwrap_or(0)),
        }
    }

    fn row_count(&self, table: &GeneratorTable) -> u64 {
        if self.options.num_records_tablename.as_deref() == Some(table.name.as_str()) {
            self.options.num_records
        } else {
            table.count.unwrap_or(self.options.num_records)
        }
    }
}

#[async_trait]
impl DataGenerationTask for SchemaDataGenerator {
    async fn run(&mut self) -> Result<GenerationMetrics, GenerationError> {
        let start = Instant::now();
        let schema = self.load_schema()?;
        let seed = batch_seed(self.base_seed(&schema)?, self.options.current_batch_number);

        let db = StagingDatabase::connect(&self.options.database_url).await?;
        let mut generator = RowGenerator::new(seed);
        let mut metrics = GenerationMetrics::default();

        for (position, table) in schema.tables.iter().enumerate() {
            let count = self.row_count(table);
            let first_id = if self.options.reset_oids {
                1
            } else {
                db.max_local_id(&table.name).await? + 1
            };

            let columns = table.column_names();
            let rows = generator.generate_rows(position, table, first_id, count);

            db.create_object_table(&table.name, &columns).await?;
            let inserted = db.insert_rows(&table.name, &columns, &rows).await?;

            info!(
                "Generated {} rows for table '{}' (ids {}..{})",
                inserted,
                table.name,
                first_id,
                first_id + count as i64
            );
            metrics.rows_generated += inserted;
            metrics.tables_created += 1;
        }

        db.close().await;

        if let Some(path) = &self.options.generate_mapping_file {
            schema.to_mapping().write_to_file(path)?;
            debug!("Wrote generated mapping to {}", path.display());
        }

        metrics.total_duration = start.elapsed();
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use staging_core::{
        Mapping, OrgConfig, ProjectConfig, Record, RecordSink, SinkError,
    };
    use staging_db::sqlite_url;
    use std::sync::Arc;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
seed: 7
tables:
  - name: accounts
    sf_object: Account
    fields:
      - name: name
        sf_field: Name
        generator:
          type: pattern
          pattern: "Account {index}"
      - name: number
        generator:
          type: sequential
          start: 1
  - name: contacts
    sf_object: Contact
    count: 2
    fields:
      - name: LastName
        generator:
          type: one_of
          values: [Smith, Jones]
      - name: account_id
        sf_field: AccountId
        generator:
          type: reference
          table: accounts
"#;

    struct NullSink;

    #[async_trait]
    impl RecordSink for NullSink {
        async fn insert_records(
            &self,
            _sf_object: &str,
            records: &[Record],
        ) -> Result<Vec<String>, SinkError> {
            Ok(records.iter().map(|_| String::new()).collect())
        }
    }

    fn setup(dir: &TempDir) -> (TaskContext, SubtaskOptions) {
        std::fs::write(dir.path().join("schema.yml"), SCHEMA).unwrap();

        let context = TaskContext::new(
            ProjectConfig::new("test", dir.path()),
            OrgConfig::new("test", Arc::new(NullSink)),
            "generate",
        );
        let mut options = SubtaskOptions {
            database_url: sqlite_url(&dir.path().join("staging.db")),
            num_records: 3,
            working_directory: dir.path().to_path_buf(),
            generate_mapping_file: Some(dir.path().join("mapping.yml")),
            ..Default::default()
        };
        options
            .data_generation_options
            .insert("schema".to_string(), json!("schema.yml"));
        (context, options)
    }

    #[test]
    fn test_row_generator_deterministic() {
        let schema = GeneratorSchema::from_yaml(SCHEMA).unwrap();

        let mut a = RowGenerator::new(1);
        let mut b = RowGenerator::new(1);
        for (position, table) in schema.tables.iter().enumerate() {
            assert_eq!(
                a.generate_rows(position, table, 1, 4),
                b.generate_rows(position, table, 1, 4)
            );
        }
    }

    #[test]
    fn test_row_generator_ids_and_references() {
        let schema = GeneratorSchema::from_yaml(SCHEMA).unwrap();
        let mut generator = RowGenerator::new(1);

        let accounts = generator.generate_rows(0, &schema.tables[0], 11, 5);
        assert_eq!(
            accounts.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![11, 12, 13, 14, 15]
        );
        assert_eq!(accounts[0].values[0].as_deref(), Some("Account 10"));
        assert_eq!(accounts[0].values[1].as_deref(), Some("11"));

        let contacts = generator.generate_rows(1, &schema.tables[1], 1, 20);
        for row in contacts {
            let account_id: i64 = row.values[1].as_deref().unwrap().parse().unwrap();
            assert!((11..16).contains(&account_id));
        }
    }

    #[tokio::test]
    async fn test_generates_tables_and_mapping() {
        let dir = TempDir::new().unwrap();
        let (context, options) = setup(&dir);
        let url = options.database_url.clone();

        let mut task = SchemaDataGenerator::new(context, options);
        let metrics = task.run().await.unwrap();
        assert_eq!(metrics.tables_created, 2);
        assert_eq!(metrics.rows_generated, 5);

        let db = StagingDatabase::connect(&url).await.unwrap();
        assert_eq!(db.count_rows("accounts").await.unwrap(), 3);
        assert_eq!(db.count_rows("contacts").await.unwrap(), 2);
        db.close().await;

        let mapping = Mapping::from_file(dir.path().join("mapping.yml")).unwrap();
        assert_eq!(mapping.table_names(), vec!["accounts", "contacts"]);
    }

    #[tokio::test]
    async fn test_num_records_tablename_overrides_count() {
        let dir = TempDir::new().unwrap();
        let (context, mut options) = setup(&dir);
        options.num_records_tablename = Some("contacts".to_string());
        let url = options.database_url.clone();

        SchemaDataGenerator::new(context, options).run().await.unwrap();

        let db = StagingDatabase::connect(&url).await.unwrap();
        assert_eq!(db.count_rows("contacts").await.unwrap(), 3);
        db.close().await;
    }

    #[tokio::test]
    async fn test_ids_continue_after_loaded_rows() {
        let dir = TempDir::new().unwrap();
        let (context, options) = setup(&dir);
        let url = options.database_url.clone();

        let db = StagingDatabase::connect(&url).await.unwrap();
        db.append_id_mappings(
            "accounts",
            &[("1".to_string(), "a".to_string()), ("2".to_string(), "b".to_string())],
        )
        .await
        .unwrap();
        db.close().await;

        SchemaDataGenerator::new(context, options).run().await.unwrap();

        let db = StagingDatabase::connect(&url).await.unwrap();
        let rows = db
            .fetch_rows("accounts", &["number".to_string()])
            .await
            .unwrap();
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        assert_eq!(rows[0].values[0].as_deref(), Some("3"));
        db.close().await;
    }

    #[tokio::test]
    async fn test_missing_schema_option() {
        let dir = TempDir::new().unwrap();
        let (context, mut options) = setup(&dir);
        options.data_generation_options.clear();

        let result = SchemaDataGenerator::new(context, options).run().await;
        assert!(matches!(result, Err(GenerationError::MissingOption("schema"))));
    }

    #[tokio::test]
    async fn test_invalid_seed_option() {
        let dir = TempDir::new().unwrap();
        let (context, mut options) = setup(&dir);
        options
            .data_generation_options
            .insert("seed".to_string(), json!("abc"));

        let result = SchemaDataGenerator::new(context, options).run().await;
        assert!(matches!(
            result,
            Err(GenerationError::InvalidOption { name: "seed", .. })
        ));
    }
}
