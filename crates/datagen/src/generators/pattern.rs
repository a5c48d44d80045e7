//! Pattern-based string generator.
//!
//! Supports placeholders:
//! - `{index}` - row index
//! - `{uuid}` - UUID drawn from the row's RNG
//! - `{rand:N}` - random N-digit number

use super::uuid::random_uuid;
use crate::values::GeneratedValue;
use rand::Rng;

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> GeneratedValue {
    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &random_uuid(rng).to_string(), 1);
    }

    // Scan forward so an unparsable `{rand:...}` is left as-is and later ones
    // still expand.
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let end = start + len;
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) => {
                let random_num = generate_random_digits(rng, digits);
                result = format!("{}{}{}", &result[..start], random_num, &result[end + 1..]);
                search_from = start + random_num.len();
            }
            Err(_) => search_from = end + 1,
        }
    }

    GeneratedValue::Text(result)
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);

    for position in 0..digits {
        // No leading zero
        let low = if position == 0 { 1 } else { 0 };
        let digit: u8 = rng.random_range(low..10);
        result.push(char::from(b'0' + digit));
    }

    result
}
