//! Orchestrator options: CLI flags, the YAML options file and validation.
//!
//! Options arrive loosely typed (numbers may be strings, flags may be
//! `"yes"`), mirroring task options in a project file. [`TaskOptions`] keeps
//! them that way until [`TaskOptions::validate`] coerces and checks them all
//! at once, before any batch runs.

use crate::error::ConfigError;
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use staging_core::{OptionMap, TaskContext};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a generate-and-load run, as configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskOptions {
    pub num_records: Option<Value>,
    pub num_records_tablename: Option<String>,
    pub batch_size: Option<Value>,
    pub mapping: Option<PathBuf>,
    pub data_generation_task: Option<String>,
    pub database_url: Option<String>,
    pub replace_database: Option<Value>,
    pub debug_dir: Option<PathBuf>,
    #[serde(default)]
    pub vars: OptionMap,
    #[serde(default)]
    pub data_generation_options: OptionMap,
    /// Any other key, passed through to both steps
    #[serde(flatten)]
    pub extra: OptionMap,
}

/// Options after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOptions {
    pub num_records: u64,
    pub num_records_tablename: Option<String>,
    pub batch_size: u64,
    /// Absolute path of the fixed mapping file
    pub mapping: Option<PathBuf>,
    pub data_generation_task: String,
    pub database_url: Option<String>,
    pub replace_database: bool,
    /// Absolute path of the debug directory
    pub debug_dir: Option<PathBuf>,
    pub vars: OptionMap,
    pub data_generation_options: OptionMap,
    pub extra: OptionMap,
}

impl ValidatedOptions {
    /// Options handed through to both steps unchanged: every unrecognised
    /// key plus the orchestrator's own settings that have no typed
    /// counterpart in the step options.
    pub fn pass_through(&self) -> OptionMap {
        let mut options = self.extra.clone();
        options.insert("batch_size".to_string(), Value::from(self.batch_size));
        options.insert(
            "data_generation_task".to_string(),
            Value::String(self.data_generation_task.clone()),
        );
        options.insert(
            "replace_database".to_string(),
            Value::Bool(self.replace_database),
        );
        if let Some(dir) = &self.debug_dir {
            options.insert(
                "debug_dir".to_string(),
                Value::String(dir.display().to_string()),
            );
        }
        options
    }
}

impl TaskOptions {
    /// Load options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::OptionsFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::OptionsFileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `other` on top of `self`. Set values in `other` win; maps are
    /// merged key by key.
    pub fn merge(mut self, other: TaskOptions) -> Self {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        overlay!(
            num_records,
            num_records_tablename,
            batch_size,
            mapping,
            data_generation_task,
            database_url,
            replace_database,
            debug_dir
        );
        self.vars.extend(other.vars);
        self.data_generation_options
            .extend(other.data_generation_options);
        self.extra.extend(other.extra);
        self
    }

    /// Coerce and check every option. Relative paths are resolved against
    /// the project root of `context`.
    pub fn validate(self, context: &TaskContext) -> Result<ValidatedOptions, ConfigError> {
        let num_records = match &self.num_records {
            Some(value) => non_negative("num_records", value)?,
            None => return Err(ConfigError::MissingOption("num_records")),
        };

        let batch_size = match &self.batch_size {
            Some(value) => {
                let size = as_integer("batch_size", value)?;
                if size <= 0 {
                    return Err(ConfigError::NonPositiveBatchSize(size));
                }
                size as u64
            }
            None => num_records.max(1),
        };

        let mapping = match self.mapping {
            Some(path) => {
                let path = absolute(context.resolve_path(path));
                if !path.is_file() {
                    return Err(ConfigError::MappingNotFound(path));
                }
                Some(path)
            }
            None => None,
        };

        let data_generation_task = self
            .data_generation_task
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingOption("data_generation_task"))?;

        Ok(ValidatedOptions {
            num_records,
            num_records_tablename: self.num_records_tablename,
            batch_size,
            mapping,
            data_generation_task,
            database_url: self.database_url.filter(|url| !url.is_empty()),
            replace_database: self.replace_database.as_ref().is_some_and(is_truthy),
            debug_dir: self
                .debug_dir
                .map(|dir| absolute(context.resolve_path(dir))),
            vars: self.vars,
            data_generation_options: self.data_generation_options,
            extra: self.extra,
        })
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

fn as_integer(name: &'static str, value: &Value) -> Result<i64, ConfigError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::NotAnInteger {
        name,
        value: value.to_string(),
    })
}

fn non_negative(name: &'static str, value: &Value) -> Result<u64, ConfigError> {
    let n = as_integer(name, value)?;
    if n < 0 {
        return Err(ConfigError::Negative { name, value: n });
    }
    Ok(n as u64)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}

/// Parse a `KEY=VALUE` argument. The value is kept as a string.
pub fn parse_key_value(s: &str) -> Result<(String, String), ConfigError> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(ConfigError::InvalidKeyValue(s.to_string())),
    }
}

/// Generate-and-load command-line options.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateAndLoadArgs {
    /// Total number of records to generate and load
    #[arg(long)]
    pub num_records: Option<i64>,

    /// Table whose row count --num-records refers to
    #[arg(long)]
    pub num_records_tablename: Option<String>,

    /// Records per batch (defaults to --num-records)
    #[arg(long)]
    pub batch_size: Option<i64>,

    /// Fixed mapping file used for every batch
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Name of the data generation task
    #[arg(long)]
    pub data_generation_task: Option<String>,

    /// Option for the data generation task (repeatable)
    #[arg(long = "data-generation-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub data_generation_options: Vec<(String, String)>,

    /// Variable passed to the generation and loading steps (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Persistent staging database (a fresh one is used per run otherwise)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Allow reusing a staging database that already has tables
    #[arg(long)]
    pub replace_database: bool,

    /// Keep the staging database and mapping files in this directory
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// YAML file with options; flags given on the command line override it
    #[arg(long)]
    pub options_file: Option<PathBuf>,
}

impl GenerateAndLoadArgs {
    /// Options set on the command line. Unset flags stay `None` so they do
    /// not override the options file.
    pub fn to_task_options(&self) -> TaskOptions {
        TaskOptions {
            num_records: self.num_records.map(Value::from),
            num_records_tablename: self.num_records_tablename.clone(),
            batch_size: self.batch_size.map(Value::from),
            mapping: self.mapping.clone(),
            data_generation_task: self.data_generation_task.clone(),
            database_url: self.database_url.clone(),
            replace_database: self.replace_database.then_some(Value::Bool(true)),
            debug_dir: self.debug_dir.clone(),
            vars: to_option_map(&self.vars),
            data_generation_options: to_option_map(&self.data_generation_options),
            extra: OptionMap::new(),
        }
    }

    /// Options file (if any) overlaid with the command-line flags.
    pub fn resolve(&self) -> Result<TaskOptions, ConfigError> {
        let base = match &self.options_file {
            Some(path) => TaskOptions::from_file(path)?,
            None => TaskOptions::default(),
        };
        Ok(base.merge(self.to_task_options()))
    }
}

fn to_option_map(pairs: &[(String, String)]) -> OptionMap {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataload::MemorySink;
    use serde_json::json;
    use staging_core::{OrgConfig, ProjectConfig};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(root: &Path) -> TaskContext {
        TaskContext::new(
            ProjectConfig::new("test", root),
            OrgConfig::new("test", Arc::new(MemorySink::new())),
            "generate_and_load",
        )
    }

    fn options(num_records: Value) -> TaskOptions {
        TaskOptions {
            num_records: Some(num_records),
            data_generation_task: Some("schema".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_num_records_coercion() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let validated = options(json!("12")).validate(&ctx).unwrap();
        assert_eq!(validated.num_records, 12);
        assert_eq!(validated.batch_size, 12);

        let validated = options(json!(0)).validate(&ctx).unwrap();
        assert_eq!(validated.num_records, 0);
        assert_eq!(validated.batch_size, 1);

        assert!(matches!(
            options(json!("twelve")).validate(&ctx),
            Err(ConfigError::NotAnInteger { name: "num_records", .. })
        ));
        assert!(matches!(
            options(json!(-3)).validate(&ctx),
            Err(ConfigError::Negative { value: -3, .. })
        ));
        assert!(matches!(
            TaskOptions::default().validate(&ctx),
            Err(ConfigError::MissingOption("num_records"))
        ));
    }

    #[test]
    fn test_batch_size_must_be_positive() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        for size in [json!(0), json!("-5")] {
            let opts = TaskOptions {
                batch_size: Some(size),
                ..options(json!(10))
            };
            assert!(matches!(
                opts.validate(&ctx),
                Err(ConfigError::NonPositiveBatchSize(_))
            ));
        }
    }

    #[test]
    fn test_mapping_resolved_and_checked() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let missing = TaskOptions {
            mapping: Some(PathBuf::from("nope.yml")),
            ..options(json!(1))
        };
        assert!(matches!(
            missing.validate(&ctx),
            Err(ConfigError::MappingNotFound(_))
        ));

        std::fs::write(dir.path().join("mapping.yml"), "steps: []\n").unwrap();
        let present = TaskOptions {
            mapping: Some(PathBuf::from("mapping.yml")),
            ..options(json!(1))
        };
        let validated = present.validate(&ctx).unwrap();
        let mapping = validated.mapping.unwrap();
        assert!(mapping.is_absolute());
        assert!(mapping.ends_with("mapping.yml"));
    }

    #[test]
    fn test_replace_database_truthiness() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        for (value, expected) in [
            (json!(true), true),
            (json!("yes"), true),
            (json!("True"), true),
            (json!(1), true),
            (json!("no"), false),
            (json!(false), false),
        ] {
            let opts = TaskOptions {
                replace_database: Some(value),
                ..options(json!(1))
            };
            assert_eq!(opts.validate(&ctx).unwrap().replace_database, expected);
        }
    }

    #[test]
    fn test_options_file_and_cli_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.yml");
        std::fs::write(
            &path,
            r#"
num_records: "20"
batch_size: 5
data_generation_task: schema
data_generation_options:
  schema: schema.yml
  seed: 3
org_shape: trial
"#,
        )
        .unwrap();

        let args = GenerateAndLoadArgs {
            batch_size: Some(7),
            data_generation_options: vec![("seed".to_string(), "9".to_string())],
            options_file: Some(path),
            ..Default::default()
        };
        let merged = args.resolve().unwrap();

        assert_eq!(merged.num_records, Some(json!("20")));
        assert_eq!(merged.batch_size, Some(json!(7)));
        assert_eq!(
            merged.data_generation_options.get("schema"),
            Some(&json!("schema.yml"))
        );
        assert_eq!(merged.data_generation_options.get("seed"), Some(&json!("9")));
        assert_eq!(merged.extra.get("org_shape"), Some(&json!("trial")));
    }

    #[test]
    fn test_pass_through_includes_orchestrator_settings() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let mut opts = TaskOptions {
            batch_size: Some(json!("4")),
            replace_database: Some(json!("yes")),
            debug_dir: Some(dir.path().join("debug")),
            ..options(json!(10))
        };
        opts.extra.insert("org_shape".to_string(), json!("trial"));

        let pass_through = opts.validate(&ctx).unwrap().pass_through();
        assert_eq!(pass_through.get("batch_size"), Some(&json!(4)));
        assert_eq!(
            pass_through.get("data_generation_task"),
            Some(&json!("schema"))
        );
        assert_eq!(pass_through.get("replace_database"), Some(&json!(true)));
        assert_eq!(
            pass_through.get("debug_dir"),
            Some(&json!(dir.path().join("debug").display().to_string()))
        );
        assert_eq!(pass_through.get("org_shape"), Some(&json!("trial")));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("schema=a=b.yml").unwrap(),
            ("schema".to_string(), "a=b.yml".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
