//! Individual value generators for different data types.
//!
//! This module provides the generation logic for each type of value
//! based on the generator configuration from the schema.

pub mod numeric;
pub mod pattern;
pub mod static_value;
pub mod timestamp;
pub mod uuid;

use crate::schema::GeneratorConfig;
use crate::values::GeneratedValue;
use rand::Rng;
use std::collections::HashMap;
use std::ops::Range;

/// Local ids generated so far in the batch, per table.
pub type GeneratedIds = HashMap<String, Range<i64>>;

/// Generate a value based on the generator configuration.
///
/// `index` is the zero-based position of the row across all batches, so
/// sequential values and `{index}` placeholders keep counting from one batch
/// to the next.
pub fn generate_value<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
    index: u64,
    generated: &GeneratedIds,
) -> GeneratedValue {
    match config {
        GeneratorConfig::UuidV4 => uuid::generate_uuid_v4(rng),

        GeneratorConfig::Sequential { start } => GeneratedValue::Int(start + index as i64),

        GeneratorConfig::Pattern { pattern } => pattern::generate_pattern(pattern, rng, index),

        GeneratorConfig::IntRange { min, max } => numeric::generate_int_range(rng, *min, *max),

        GeneratorConfig::FloatRange { min, max } => numeric::generate_float_range(rng, *min, *max),

        GeneratorConfig::DecimalRange { min, max, scale } => {
            numeric::generate_decimal_range(rng, *min, *max, *scale)
        }

        GeneratorConfig::TimestampRange { start, end } => {
            timestamp::generate_timestamp_range(rng, start, end)
        }

        GeneratorConfig::WeightedBool { true_weight } => {
            GeneratedValue::Bool(rng.random_bool(true_weight.clamp(0.0, 1.0)))
        }

        GeneratorConfig::OneOf { values } => {
            if values.is_empty() {
                GeneratedValue::Null
            } else {
                let idx = rng.random_range(0..values.len());
                static_value::yaml_to_generated_value(&values[idx])
            }
        }

        GeneratorConfig::Static { value } => static_value::yaml_to_generated_value(value),

        GeneratorConfig::Null => GeneratedValue::Null,

        GeneratorConfig::Reference { table } => match generated.get(table) {
            Some(ids) if !ids.is_empty() => GeneratedValue::Int(rng.random_range(ids.clone())),
            _ => GeneratedValue::Null,
        },
    }
}
