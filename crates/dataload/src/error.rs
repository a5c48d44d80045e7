//! Error types for the loading step.

use thiserror::Error;

/// Errors raised by a loading step.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No mapping was handed to the step.
    #[error("No mapping file was provided to the loading step")]
    MissingMapping,

    /// The mapping could not be read.
    #[error("Mapping error: {0}")]
    Mapping(#[from] staging_core::MappingError),

    /// Staging database error.
    #[error("Staging database error: {0}")]
    Staging(#[from] staging_db::StagingError),

    /// The external system failed.
    #[error("Sink error: {0}")]
    Sink(#[from] staging_core::SinkError),

    /// A lookup column holds a local id that was never loaded.
    #[error(
        "Step '{step}': {sf_field} of row {row_id} references {table} id {local_id}, which has not been loaded"
    )]
    UnresolvedLookup {
        step: String,
        sf_field: String,
        table: String,
        row_id: i64,
        local_id: String,
    },

    /// The sink returned a different number of ids than records sent.
    #[error("{sf_object}: sent {sent} records but received {received} ids")]
    IdCountMismatch {
        sf_object: String,
        sent: usize,
        received: usize,
    },

    /// Failure reported by a custom loading task.
    #[error("Data load failed: {0}")]
    Task(String),
}
