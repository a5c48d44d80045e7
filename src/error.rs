//! Error types for the batch orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems, all detected before any batch runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("Option '{name}' must be an integer, got {value}")]
    NotAnInteger { name: &'static str, value: String },

    #[error("Option '{name}' must not be negative, got {value}")]
    Negative { name: &'static str, value: i64 },

    #[error("Batch size should be greater than zero, got {0}")]
    NonPositiveBatchSize(i64),

    #[error("Mapping file not found: {}", .0.display())]
    MappingNotFound(PathBuf),

    #[error("Unknown data generation task '{name}' (known: {known})")]
    UnknownTask { name: String, known: String },

    #[error(
        "Database {url} has tables ({}) but `replace_database` was not specified",
        .tables.join(", ")
    )]
    DatabaseNotEmpty { url: String, tables: Vec<String> },

    #[error("Unsupported database_url '{0}': only sqlite: locators are supported")]
    UnsupportedDatabaseUrl(String),

    #[error("Cannot open database {url}: {source}")]
    DatabaseUnavailable {
        url: String,
        source: staging_db::StagingError,
    },

    #[error("Failed to read options file {}: {source}", .path.display())]
    OptionsFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse options file {}: {source}", .path.display())]
    OptionsFileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid KEY=VALUE pair: {0}")]
    InvalidKeyValue(String),
}

/// Errors raised by a generate-and-load run.
#[derive(Debug, Error)]
pub enum GenerateAndLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Staging database error: {0}")]
    Staging(#[from] staging_db::StagingError),

    #[error(transparent)]
    Generation(#[from] datagen::GenerationError),

    #[error(transparent)]
    Load(#[from] dataload::LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
