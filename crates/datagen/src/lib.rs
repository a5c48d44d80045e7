//! Data generation step for generate-and-load.
//!
//! This crate provides the [`DataGenerationTask`] trait every generation step
//! implements, the [`GeneratorRegistry`] that resolves a configured task name
//! to a constructor, and one built-in task, [`SchemaDataGenerator`], which
//! fills the staging database from a YAML generator schema.
//!
//! # Architecture
//!
//! ```text
//! GeneratorSchema (YAML)
//!        │
//!        ▼
//! ┌─────────────────────┐      ┌──────────────────┐
//! │ SchemaDataGenerator │ ───▶ │  RowGenerator    │
//! │  (one batch)        │      │  - rng (StdRng)  │
//! └─────────┬───────────┘      └──────────────────┘
//!           │
//!           ├──▶ staging tables (StagingDatabase)
//!           └──▶ generated mapping file (Mapping YAML)
//! ```
//!
//! # Generator schema
//!
//! ```yaml
//! version: 1
//! seed: 42
//! tables:
//!   - name: accounts
//!     sf_object: Account
//!     fields:
//!       - name: name
//!         sf_field: Name
//!         generator:
//!           type: pattern
//!           pattern: "Account {index}"
//!   - name: contacts
//!     sf_object: Contact
//!     fields:
//!       - name: last_name
//!         sf_field: LastName
//!         generator:
//!           type: one_of
//!           values: [Smith, Jones, Lee]
//!       - name: account_id
//!         sf_field: AccountId
//!         generator:
//!           type: reference
//!           table: accounts
//! ```
//!
//! # Generators
//!
//! - `uuid_v4` - Random UUID v4
//! - `sequential` - Sequential integers
//! - `pattern` - Pattern strings with placeholders (`{index}`, `{uuid}`, `{rand:N}`)
//! - `int_range` / `float_range` / `decimal_range` - Random numbers in a range
//! - `timestamp_range` - Random timestamps in a date range
//! - `weighted_bool` - Boolean with configurable true probability
//! - `one_of` - Random selection from a list
//! - `static` - Static value
//! - `null` - Null value
//! - `reference` - Local id of a row generated earlier in the batch

mod error;
pub mod generator;
pub mod generators;
mod registry;
pub mod schema;
mod task;
pub mod values;

// Re-exports for convenience
pub use error::{GenerationError, SchemaError};
pub use generator::{batch_seed, RowGenerator, SchemaDataGenerator};
pub use registry::{GeneratorConstructor, GeneratorRegistry, SCHEMA_GENERATOR};
pub use schema::{GeneratorConfig, GeneratorField, GeneratorSchema, GeneratorTable};
pub use task::{DataGenerationTask, GenerationMetrics};
pub use values::GeneratedValue;
