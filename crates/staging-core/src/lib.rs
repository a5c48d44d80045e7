//! Core types for the generate-and-load framework.
//!
//! This crate provides the foundational types shared by the orchestrator,
//! the generation step and the loading step:
//!
//! - [`generate_batches`] - Partitioning of a record count into batches
//! - [`Mapping`] - Load mapping files (YAML)
//! - [`SubtaskOptions`] - Options handed to the generation and loading steps
//! - [`TaskContext`] - Project, org and flow context shared by every step
//! - [`RecordSink`] - Client for the external system records are loaded into
//!
//! # Architecture
//!
//! ```text
//! staging-core (this crate)
//!    │
//!    ├─── staging-db   (SQLite staging store)
//!    ├─── datagen      (generation step, registry)
//!    ├─── dataload     (loading step, sinks)
//!    └─── generate-and-load (orchestrator, CLI)
//! ```

pub mod batches;
pub mod context;
pub mod mapping;
pub mod options;
pub mod sink;

// Re-exports for convenience
pub use batches::{generate_batches, BatchSpec, Batches};
pub use context::{OrgConfig, ProjectConfig, TaskContext};
pub use mapping::{Lookup, Mapping, MappingError, MappingStep};
pub use options::{OptionMap, SubtaskOptions};
pub use sink::{Record, RecordSink, SinkError};
