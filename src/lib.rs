//! Generate-and-load: batch record generation and loading.
//!
//! A run splits `num_records` into batches of at most `batch_size`. Each
//! batch runs a pluggable generation step that fills a SQLite staging
//! database, then a loading step that sends the staged rows to an org
//! through a [`staging_core::RecordSink`]. Object tables are recreated every
//! batch; the `*_sf_ids` ID-mapping tables persist and grow for the life of
//! the staging database.
//!
//! # Example
//!
//! ```ignore
//! use generate_and_load::{GenerateAndLoad, TaskOptions};
//!
//! let options = TaskOptions::from_file("options.yml")?;
//! let task = GenerateAndLoad::new(options, context, &GeneratorRegistry::with_builtin()).await?;
//! let summary = task.run().await?;
//! println!("{} records loaded", summary.rows_loaded());
//! ```

pub mod error;
pub mod options;
pub mod orchestrator;

pub use error::{ConfigError, GenerateAndLoadError};
pub use options::{parse_key_value, GenerateAndLoadArgs, TaskOptions, ValidatedOptions};
pub use orchestrator::{BatchSummary, GenerateAndLoad, RunSummary, TRANSIENT_DATABASE};
