//! Loading step trait and metrics.

use crate::error::LoadError;
use async_trait::async_trait;
use staging_core::{SubtaskOptions, TaskContext};
use std::sync::Arc;
use std::time::Duration;

/// Rows loaded by one mapping step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMetrics {
    pub name: String,
    pub sf_object: String,
    pub rows_loaded: u64,
}

/// Metrics from one loading step.
#[derive(Debug, Clone, Default)]
pub struct LoadMetrics {
    /// Per mapping step, in load order.
    pub steps: Vec<StepMetrics>,
    /// Total time taken.
    pub total_duration: Duration,
}

impl LoadMetrics {
    /// Total rows loaded across all steps.
    pub fn rows_loaded(&self) -> u64 {
        self.steps.iter().map(|s| s.rows_loaded).sum()
    }
}

/// A loading step, constructed per batch and run once.
#[async_trait]
pub trait DataLoadTask: Send {
    async fn run(&mut self) -> Result<LoadMetrics, LoadError>;
}

/// Builds a loading step for one batch.
pub type LoaderConstructor =
    Arc<dyn Fn(TaskContext, SubtaskOptions) -> Box<dyn DataLoadTask> + Send + Sync>;
