//! SQLite staging store for generate-and-load.
//!
//! The staging database is the buffer between the generation step and the
//! loading step. It holds two kinds of tables:
//!
//! - **object tables**: generated rows, `id INTEGER PRIMARY KEY` plus one
//!   `TEXT` column per field. Recreated every batch.
//! - **ID-mapping tables**: `<table>_sf_ids (id, sf_id)`, recording the
//!   external id assigned to every loaded row. Append-only; they survive
//!   between batches.
//!
//! # Example
//!
//! ```ignore
//! use staging_db::StagingDatabase;
//!
//! let db = StagingDatabase::connect("sqlite:///tmp/generated_data.db").await?;
//! let dropped = db.drop_object_tables().await?;
//! db.close().await;
//! ```

mod error;
mod store;

pub use error::StagingError;
pub use store::{
    id_table_name, is_id_table, sqlite_url, StagedRow, StagingDatabase, ID_TABLE_SUFFIX,
};
