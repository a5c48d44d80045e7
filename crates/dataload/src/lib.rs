//! Loading step for generate-and-load.
//!
//! [`LoadData`] reads the object tables named by a mapping from the staging
//! database, resolves lookups through the ID-mapping tables written by
//! earlier steps and batches, sends the records to the org's
//! [`staging_core::RecordSink`] and records the ids it hands back.
//!
//! Two sinks ship with the crate: [`LocalOrgSink`] writes one JSON Lines file
//! per external object into a directory, and [`MemorySink`] keeps everything
//! in memory.

mod error;
mod load;
pub mod sinks;
mod task;

pub use error::LoadError;
pub use load::{load_data, LoadData, DEFAULT_CHUNK_SIZE};
pub use sinks::{LocalOrgSink, MemorySink};
pub use task::{DataLoadTask, LoadMetrics, LoaderConstructor, StepMetrics};
