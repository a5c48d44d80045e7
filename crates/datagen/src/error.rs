//! Error types for the generation step.

use thiserror::Error;

/// Error type for generator schema operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read generator schema: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse generator schema YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Table not found in schema
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Two tables share a name
    #[error("Duplicate table in generator schema: {0}")]
    DuplicateTable(String),

    /// Two fields of one table load into the same object field
    #[error("Duplicate sf_field '{sf_field}' in table '{table}'")]
    DuplicateField { table: String, sf_field: String },

    /// Generator parameters that cannot produce a value
    #[error("Invalid generator for '{table}.{field}': {reason}")]
    InvalidGenerator {
        table: String,
        field: String,
        reason: String,
    },

    /// A reference to a table not generated before this one
    #[error("Field '{table}.{field}' references '{target}', which is not generated before it")]
    ForwardReference {
        table: String,
        field: String,
        target: String,
    },
}

/// Errors raised by a generation step.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No generation task registered under this name.
    #[error("Unknown data generation task '{name}' (known: {known})")]
    UnknownTask { name: String, known: String },

    /// A required option was not supplied.
    #[error("Missing data generation option '{0}'")]
    MissingOption(&'static str),

    /// An option could not be interpreted.
    #[error("Invalid data generation option '{name}': {value}")]
    InvalidOption { name: &'static str, value: String },

    /// Schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Staging database error.
    #[error("Staging database error: {0}")]
    Staging(#[from] staging_db::StagingError),

    /// Writing the generated mapping failed.
    #[error("Mapping error: {0}")]
    Mapping(#[from] staging_core::MappingError),

    /// Failure reported by a custom generation task.
    #[error("Data generation failed: {0}")]
    Task(String),
}
