//! Options handed from the orchestrator to the generation and loading steps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Opaque option values passed through without interpretation.
pub type OptionMap = BTreeMap<String, serde_json::Value>;

/// Options for one batch's generation and loading steps.
///
/// The fields the steps read directly are typed; everything else the
/// orchestrator was configured with travels in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubtaskOptions {
    /// Mapping file used to load the batch. `None` until the generation step
    /// has produced one when no fixed mapping is configured.
    pub mapping: Option<PathBuf>,

    /// Where the generation step may write the mapping it generates
    pub generate_mapping_file: Option<PathBuf>,

    /// Whether the loading step clears the ID-mapping tables first
    pub reset_oids: bool,

    /// Staging database locator
    pub database_url: String,

    /// Number of records in this batch
    pub num_records: u64,

    /// Table whose row count `num_records` refers to
    pub num_records_tablename: Option<String>,

    /// Zero-based batch index
    pub current_batch_number: u64,

    /// Scratch directory for the run
    pub working_directory: PathBuf,

    /// Variables the generation or loading step might need
    #[serde(default)]
    pub vars: OptionMap,

    /// Options meant for the generation step only
    #[serde(default)]
    pub data_generation_options: OptionMap,

    /// Remaining orchestrator options, passed through
    #[serde(flatten)]
    pub extra: OptionMap,
}

impl SubtaskOptions {
    /// Get a data generation option as a string.
    ///
    /// Numbers and booleans are rendered as text; other JSON values yield `None`.
    pub fn data_generation_option(&self, key: &str) -> Option<String> {
        self.data_generation_options.get(key).and_then(scalar_to_string)
    }

    /// Get a variable as a string.
    pub fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).and_then(scalar_to_string)
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_options_as_strings() {
        let mut options = SubtaskOptions::default();
        options
            .data_generation_options
            .insert("schema".to_string(), json!("schema.yml"));
        options
            .data_generation_options
            .insert("seed".to_string(), json!(7));
        options.vars.insert("nested".to_string(), json!({"a": 1}));

        assert_eq!(
            options.data_generation_option("schema").as_deref(),
            Some("schema.yml")
        );
        assert_eq!(options.data_generation_option("seed").as_deref(), Some("7"));
        assert_eq!(options.var("nested"), None);
        assert_eq!(options.var("missing"), None);
    }

    #[test]
    fn test_extra_options_flatten() {
        let mut options = SubtaskOptions {
            database_url: "sqlite:///tmp/x.db".to_string(),
            ..Default::default()
        };
        options
            .extra
            .insert("org_shape".to_string(), json!("dev"));

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["org_shape"], json!("dev"));
        assert_eq!(value["database_url"], json!("sqlite:///tmp/x.db"));
    }
}
