//! Error types for the staging store.

use thiserror::Error;

/// Errors that can occur while accessing the staging database.
#[derive(Error, Debug)]
pub enum StagingError {
    /// The locator does not name a SQLite database.
    #[error("Unsupported staging database URL '{0}' (expected sqlite:///path)")]
    UnsupportedUrl(String),

    /// SQLite connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Table not found in the staging database.
    #[error("Table '{0}' not found in staging database")]
    TableNotFound(String),

    /// Column not found in a staging table.
    #[error("Column '{column}' not found in staging table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// A row does not carry one value per column.
    #[error("Row {id} for table '{table}' has {actual} values, expected {expected}")]
    ColumnCountMismatch {
        table: String,
        id: i64,
        expected: usize,
        actual: usize,
    },
}
