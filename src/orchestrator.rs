//! Batch orchestrator.
//!
//! Splits the requested record count into batches and, for each batch,
//! resets the staging database's object tables, runs the generation step
//! into it and then the loading step out of it. The `*_sf_ids` tables the
//! loading step appends to are left alone, so local-to-external id mappings
//! accumulate across batches.

use crate::error::{ConfigError, GenerateAndLoadError};
use crate::options::{TaskOptions, ValidatedOptions};
use datagen::{GenerationError, GeneratorConstructor, GeneratorRegistry};
use dataload::{load_data, DataLoadTask, LoaderConstructor};
use staging_core::{generate_batches, BatchSpec, Batches, SubtaskOptions, TaskContext};
use staging_db::{sqlite_url, StagingDatabase, StagingError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

/// File name of the transient staging database in the working directory.
pub const TRANSIENT_DATABASE: &str = "generated_data.db";

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub size: u64,
    pub index: u64,
    pub rows_generated: u64,
    pub rows_loaded: u64,
}

/// Outcome of a run, one entry per batch in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: Vec<BatchSummary>,
}

impl RunSummary {
    pub fn rows_loaded(&self) -> u64 {
        self.batches.iter().map(|b| b.rows_loaded).sum()
    }
}

async fn existing_tables(url: &str) -> Result<Vec<String>, StagingError> {
    let db = StagingDatabase::connect(url).await?;
    let tables = db.table_names().await;
    db.close().await;
    tables
}

/// Generates and loads records in batches through a staging database.
pub struct GenerateAndLoad {
    options: ValidatedOptions,
    context: TaskContext,
    generator: GeneratorConstructor,
    loader: LoaderConstructor,
}

impl GenerateAndLoad {
    /// Validate `options` and resolve the generation task in `registry`.
    ///
    /// A `database_url` that already holds tables is refused unless
    /// `replace_database` is set. Nothing is modified here.
    pub async fn new(
        options: TaskOptions,
        context: TaskContext,
        registry: &GeneratorRegistry,
    ) -> Result<Self, GenerateAndLoadError> {
        let options = options.validate(&context)?;

        let generator = match registry.resolve(&options.data_generation_task) {
            Ok(constructor) => constructor,
            Err(GenerationError::UnknownTask { name, known }) => {
                return Err(ConfigError::UnknownTask { name, known }.into())
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(url) = &options.database_url {
            let tables = existing_tables(url).await.map_err(|e| match e {
                StagingError::UnsupportedUrl(locator) => {
                    ConfigError::UnsupportedDatabaseUrl(locator)
                }
                source => ConfigError::DatabaseUnavailable {
                    url: url.clone(),
                    source,
                },
            })?;

            if !tables.is_empty() && !options.replace_database {
                return Err(ConfigError::DatabaseNotEmpty {
                    url: url.clone(),
                    tables,
                }
                .into());
            }
        }

        Ok(Self {
            options,
            context,
            generator,
            loader: Arc::new(load_data),
        })
    }

    /// Replace the loading step.
    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(TaskContext, SubtaskOptions) -> Box<dyn DataLoadTask> + Send + Sync + 'static,
    {
        self.loader = Arc::new(loader);
        self
    }

    /// Validated options.
    pub fn options(&self) -> &ValidatedOptions {
        &self.options
    }

    /// The batches a run will execute.
    pub fn batches(&self) -> Batches {
        generate_batches(self.options.num_records, self.options.batch_size)
    }

    /// Run every batch in order, stopping at the first error.
    ///
    /// Without a `debug_dir`, the working directory (and the transient
    /// staging database in it) is a temporary directory removed when this
    /// returns, whether or not it succeeded.
    pub async fn run(&self) -> Result<RunSummary, GenerateAndLoadError> {
        let (_temp_dir, working_dir) = match &self.options.debug_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                (None, dir.clone())
            }
            None => {
                let temp_dir = TempDir::new()?;
                let path = temp_dir.path().to_path_buf();
                (Some(temp_dir), path)
            }
        };

        let database_url = match &self.options.database_url {
            Some(url) => url.clone(),
            None => sqlite_url(&working_dir.join(TRANSIENT_DATABASE)),
        };
        debug!(
            "Working directory {}, staging database {}",
            working_dir.display(),
            database_url
        );

        let mut summary = RunSummary::default();
        for batch in self.batches() {
            info!(
                "Generating a batch, size={} index={} total_records={}",
                batch.size, batch.index, self.options.num_records
            );
            let result = self.generate_batch(batch, &working_dir, &database_url).await?;
            summary.batches.push(result);
        }

        info!(
            "Loaded {} records in {} batches",
            summary.rows_loaded(),
            summary.batches.len()
        );
        Ok(summary)
    }

    async fn generate_batch(
        &self,
        batch: BatchSpec,
        working_dir: &Path,
        database_url: &str,
    ) -> Result<BatchSummary, GenerateAndLoadError> {
        let db = StagingDatabase::connect(database_url).await?;
        let dropped = db.drop_object_tables().await?;
        db.close().await;
        if !dropped.is_empty() {
            debug!("Dropped object tables: {}", dropped.join(", "));
        }

        // Removed when this function returns, on success or failure.
        let generated_mapping = tempfile::Builder::new()
            .suffix("_mapping.yml")
            .tempfile_in(working_dir)?;

        let mut options = SubtaskOptions {
            mapping: self.options.mapping.clone(),
            generate_mapping_file: Some(generated_mapping.path().to_path_buf()),
            reset_oids: false,
            database_url: database_url.to_string(),
            num_records: batch.size,
            num_records_tablename: self.options.num_records_tablename.clone(),
            current_batch_number: batch.index,
            working_directory: working_dir.to_path_buf(),
            vars: self.options.vars.clone(),
            data_generation_options: self.options.data_generation_options.clone(),
            extra: self.options.pass_through(),
        };

        let generated = (self.generator)(self.context.clone(), options.clone())
            .run()
            .await?;

        if options.mapping.is_none() {
            options.mapping = Some(generated_mapping.path().to_path_buf());
        }

        let loaded = (self.loader)(self.context.clone(), options).run().await?;

        Ok(BatchSummary {
            size: batch.size,
            index: batch.index,
            rows_generated: generated.rows_generated,
            rows_loaded: loaded.rows_loaded(),
        })
    }
}
