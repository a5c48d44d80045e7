//! Static value generator and YAML to GeneratedValue conversion.

use crate::values::GeneratedValue;
use serde_yaml::Value as YamlValue;

/// Convert a YAML value to a GeneratedValue.
///
/// Staging columns are flat text, so sequences and mappings are kept as their
/// JSON rendering.
pub fn yaml_to_generated_value(yaml: &YamlValue) -> GeneratedValue {
    match yaml {
        YamlValue::Null => GeneratedValue::Null,
        YamlValue::Bool(b) => GeneratedValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                GeneratedValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                GeneratedValue::Float(f)
            } else {
                GeneratedValue::Text(n.to_string())
            }
        }
        YamlValue::String(s) => GeneratedValue::Text(s.clone()),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            match serde_json::to_string(yaml) {
                Ok(json) => GeneratedValue::Text(json),
                Err(_) => GeneratedValue::Null,
            }
        }
        YamlValue::Tagged(tagged) => yaml_to_generated_value(&tagged.value),
    }
}
