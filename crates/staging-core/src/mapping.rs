//! Load mapping files.
//!
//! A mapping describes, step by step, which staging table feeds which
//! external object and how staging columns map onto external fields:
//!
//! ```yaml
//! version: 1
//! steps:
//!   - name: Insert Accounts
//!     sf_object: Account
//!     table: accounts
//!     fields:
//!       Name: name
//!   - name: Insert Contacts
//!     sf_object: Contact
//!     table: contacts
//!     fields:
//!       LastName: last_name
//!     lookups:
//!       AccountId:
//!         table: accounts
//!         key_field: account_id
//! ```
//!
//! Steps are loaded in the order they appear, so a lookup must point at a
//! table loaded by an earlier step (or by an earlier batch).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Error type for mapping operations.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// Error reading or writing a mapping file
    #[error("Failed to access mapping file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing or emitting YAML
    #[error("Failed to parse mapping YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two steps share a name
    #[error("Duplicate mapping step: {0}")]
    DuplicateStep(String),

    /// A step is missing its table or object name
    #[error("Mapping step '{step}' is missing '{field}'")]
    IncompleteStep { step: String, field: &'static str },
}

/// A reference from an external field to another staging table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lookup {
    /// Staging table whose rows the field points at
    pub table: String,

    /// Staging column holding the referenced local id.
    /// Defaults to the external field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
}

impl Lookup {
    /// Staging column that holds the local id for `sf_field`.
    pub fn key_field<'a>(&'a self, sf_field: &'a str) -> &'a str {
        self.key_field.as_deref().unwrap_or(sf_field)
    }
}

/// One load step: a staging table loaded into one external object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingStep {
    /// Step name, unique within the mapping
    pub name: String,

    /// External object the rows are loaded into
    pub sf_object: String,

    /// Staging table the rows are read from
    pub table: String,

    /// External field name -> staging column
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// External field name -> referenced staging table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lookups: BTreeMap<String, Lookup>,
}

impl MappingStep {
    /// Staging columns read by this step (plain fields first, then lookup keys).
    pub fn staging_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.fields.values().map(|c| c.as_str()).collect();
        columns.extend(
            self.lookups
                .iter()
                .map(|(sf_field, lookup)| lookup.key_field(sf_field)),
        );
        columns
    }
}

fn default_version() -> u32 {
    1
}

/// A complete load mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mapping {
    /// Mapping format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Load steps, in load order
    #[serde(default)]
    pub steps: Vec<MappingStep>,
}

impl Mapping {
    /// Load a mapping from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a mapping from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, MappingError> {
        let mapping: Mapping = serde_yaml::from_str(yaml)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Serialize the mapping to YAML.
    pub fn to_yaml(&self) -> Result<String, MappingError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the mapping to a YAML file, replacing its contents.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MappingError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Get a step by name.
    pub fn get_step(&self, name: &str) -> Option<&MappingStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Staging tables loaded by this mapping, in load order.
    pub fn table_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.table.as_str()).collect()
    }

    fn validate(&self) -> Result<(), MappingError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(MappingError::DuplicateStep(step.name.clone()));
            }
            if step.table.is_empty() {
                return Err(MappingError::IncompleteStep {
                    step: step.name.clone(),
                    field: "table",
                });
            }
            if step.sf_object.is_empty() {
                return Err(MappingError::IncompleteStep {
                    step: step.name.clone(),
                    field: "sf_object",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_MAPPING: &str = r#"
version: 1
steps:
  - name: Insert Accounts
    sf_object: Account
    table: accounts
    fields:
      Name: name
      Industry: industry
  - name: Insert Contacts
    sf_object: Contact
    table: contacts
    fields:
      LastName: last_name
    lookups:
      AccountId:
        table: accounts
        key_field: account_id
"#;

    #[test]
    fn test_parse_mapping() {
        let mapping = Mapping::from_yaml(SAMPLE_MAPPING).unwrap();

        assert_eq!(mapping.version, 1);
        assert_eq!(mapping.table_names(), vec!["accounts", "contacts"]);

        let contacts = mapping.get_step("Insert Contacts").unwrap();
        assert_eq!(contacts.sf_object, "Contact");
        assert_eq!(contacts.staging_columns(), vec!["last_name", "account_id"]);
    }

    #[test]
    fn test_lookup_key_field_defaults_to_sf_field() {
        let lookup = Lookup {
            table: "accounts".to_string(),
            key_field: None,
        };
        assert_eq!(lookup.key_field("AccountId"), "AccountId");
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let yaml = r#"
steps:
  - name: Accounts
    sf_object: Account
    table: accounts
  - name: Accounts
    sf_object: Account
    table: accounts_two
"#;
        let result = Mapping::from_yaml(yaml);
        assert!(matches!(result, Err(MappingError::DuplicateStep(name)) if name == "Accounts"));
    }

    #[test]
    fn test_incomplete_step_rejected() {
        let yaml = r#"
steps:
  - name: Accounts
    sf_object: ""
    table: accounts
"#;
        let result = Mapping::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(MappingError::IncompleteStep {
                field: "sf_object",
                ..
            })
        ));
    }

    #[test]
    fn test_write_and_reload() {
        let mapping = Mapping::from_yaml(SAMPLE_MAPPING).unwrap();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mapping.yml");

        mapping.write_to_file(&path).unwrap();
        let reloaded = Mapping::from_file(&path).unwrap();

        assert_eq!(mapping, reloaded);
    }
}
