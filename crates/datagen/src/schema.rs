//! Generator schema: which tables to generate and how to fill each field.
//!
//! The same schema also yields the load mapping for the generated tables, so
//! a run without a fixed mapping file still knows how to load what it made.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use staging_core::{Lookup, Mapping, MappingStep};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

fn default_version() -> u32 {
    1
}

fn default_scale() -> usize {
    2
}

/// Generator configuration for a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Generate UUIDs (v4)
    UuidV4,

    /// Generate sequential integers
    Sequential {
        /// Starting value
        #[serde(default)]
        start: i64,
    },

    /// Generate values using a pattern with placeholders
    Pattern {
        /// Pattern string (supports {index}, {uuid}, {rand:N})
        pattern: String,
    },

    /// Generate random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Generate random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate random decimals in a range
    DecimalRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
        /// Digits after the decimal point
        #[serde(default = "default_scale")]
        scale: usize,
    },

    /// Generate timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601 or YYYY-MM-DD)
        start: String,
        /// End timestamp (ISO 8601 or YYYY-MM-DD)
        end: String,
    },

    /// Generate weighted boolean values
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Generate random selection from a pool of values
    OneOf {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
    },

    /// Generate a static value
    Static {
        /// The static value to use
        value: serde_yaml::Value,
    },

    /// Generate null values
    Null,

    /// Pick the local id of a row generated earlier in the same batch
    Reference {
        /// Table whose rows are referenced
        table: String,
    },
}

/// A generated field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorField {
    /// Staging column name
    pub name: String,

    /// External field the column loads into. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sf_field: Option<String>,

    /// Generator configuration for this field
    pub generator: GeneratorConfig,
}

impl GeneratorField {
    /// External field name.
    pub fn sf_field(&self) -> &str {
        self.sf_field.as_deref().unwrap_or(&self.name)
    }
}

/// A generated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorTable {
    /// Staging table name
    pub name: String,

    /// External object the table loads into
    pub sf_object: String,

    /// Fixed row count per batch. When unset the batch size is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Field definitions
    #[serde(default)]
    pub fields: Vec<GeneratorField>,
}

impl GeneratorTable {
    /// Staging column names, in field order.
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Load step for this table.
    pub fn to_mapping_step(&self) -> MappingStep {
        let mut fields = BTreeMap::new();
        let mut lookups = BTreeMap::new();

        for field in &self.fields {
            match &field.generator {
                GeneratorConfig::Reference { table } => {
                    lookups.insert(
                        field.sf_field().to_string(),
                        Lookup {
                            table: table.clone(),
                            key_field: Some(field.name.clone()),
                        },
                    );
                }
                _ => {
                    fields.insert(field.sf_field().to_string(), field.name.clone());
                }
            }
        }

        MappingStep {
            name: format!("Insert {}", self.name),
            sf_object: self.sf_object.clone(),
            table: self.name.clone(),
            fields,
            lookups,
        }
    }
}

/// Full generator schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSchema {
    /// Schema format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Base seed for the random number generator
    #[serde(default)]
    pub seed: Option<u64>,

    /// Tables, in generation (and load) order
    pub tables: Vec<GeneratorTable>,
}

impl GeneratorSchema {
    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse schema from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let schema: GeneratorSchema = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&GeneratorTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get all table names in the schema.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Load mapping for every table, in generation order.
    pub fn to_mapping(&self) -> Mapping {
        Mapping {
            version: 1,
            steps: self.tables.iter().map(|t| t.to_mapping_step()).collect(),
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut generated = HashSet::new();

        for table in &self.tables {
            let mut sf_fields = HashSet::new();
            for field in &table.fields {
                if !sf_fields.insert(field.sf_field()) {
                    return Err(SchemaError::DuplicateField {
                        table: table.name.clone(),
                        sf_field: field.sf_field().to_string(),
                    });
                }

                let invalid = |reason: &str| SchemaError::InvalidGenerator {
                    table: table.name.clone(),
                    field: field.name.clone(),
                    reason: reason.to_string(),
                };

                match &field.generator {
                    GeneratorConfig::IntRange { min, max } if min > max => {
                        return Err(invalid("min is greater than max"));
                    }
                    GeneratorConfig::FloatRange { min, max }
                    | GeneratorConfig::DecimalRange { min, max, .. }
                        if min > max =>
                    {
                        return Err(invalid("min is greater than max"));
                    }
                    GeneratorConfig::WeightedBool { true_weight }
                        if !(0.0..=1.0).contains(true_weight) =>
                    {
                        return Err(invalid("true_weight must be between 0.0 and 1.0"));
                    }
                    GeneratorConfig::Reference { table: target }
                        if !generated.contains(target.as_str()) =>
                    {
                        return Err(SchemaError::ForwardReference {
                            table: table.name.clone(),
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                    _ => {}
                }
            }

            if !generated.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }
        }

        Ok(())
    }
}
