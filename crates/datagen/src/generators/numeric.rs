//! Numeric value generators.

use crate::values::GeneratedValue;
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> GeneratedValue {
    GeneratedValue::Int(rng.random_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> GeneratedValue {
    GeneratedValue::Float(rng.random_range(min..=max))
}

/// Generate a random decimal in the given range, formatted with `scale`
/// digits after the decimal point.
pub fn generate_decimal_range<R: Rng>(
    rng: &mut R,
    min: f64,
    max: f64,
    scale: usize,
) -> GeneratedValue {
    let value = rng.random_range(min..=max);
    GeneratedValue::Decimal(format!("{value:.scale$}"))
}
