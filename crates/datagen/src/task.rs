//! Generation step trait.

use crate::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// Metrics from one generation step.
#[derive(Debug, Clone, Default)]
pub struct GenerationMetrics {
    /// Number of rows written to the staging database.
    pub rows_generated: u64,
    /// Number of object tables created.
    pub tables_created: usize,
    /// Total time taken.
    pub total_duration: Duration,
}

impl GenerationMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_generated as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// A generation step.
///
/// Implementations are built by a [`crate::GeneratorRegistry`] constructor
/// from the task context and the batch's options, then run once. A run is
/// expected to populate the staging database's object tables and, when
/// `generate_mapping_file` is set, write a mapping for them there.
#[async_trait]
pub trait DataGenerationTask: Send {
    async fn run(&mut self) -> Result<GenerationMetrics, GenerationError>;
}
