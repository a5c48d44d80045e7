//! Timestamp value generators.

use crate::values::GeneratedValue;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

/// Generate a random timestamp in the given range, at one-second resolution.
///
/// Falls back to whichever bound parses when only one does, and to NULL when
/// neither does.
pub fn generate_timestamp_range<R: Rng>(rng: &mut R, start: &str, end: &str) -> GeneratedValue {
    match (parse_timestamp(start), parse_timestamp(end)) {
        (Some(start), Some(end)) => {
            let start_ts = start.timestamp();
            let end_ts = end.timestamp();

            if start_ts >= end_ts {
                GeneratedValue::Timestamp(start)
            } else {
                let random_ts = rng.random_range(start_ts..=end_ts);
                let dt = DateTime::from_timestamp(random_ts, 0).unwrap_or(start);
                GeneratedValue::Timestamp(dt)
            }
        }
        (Some(dt), None) | (None, Some(dt)) => GeneratedValue::Timestamp(dt),
        (None, None) => GeneratedValue::Null,
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_timestamp_range() {
        let mut rng = StdRng::seed_from_u64(42);

        let value =
            generate_timestamp_range(&mut rng, "2020-01-01T00:00:00Z", "2024-12-31T23:59:59Z");

        if let GeneratedValue::Timestamp(dt) = value {
            assert!(dt.year() >= 2020 && dt.year() <= 2024);
        } else {
            panic!("Expected Timestamp value");
        }
    }

    #[test]
    fn test_generate_timestamp_with_dates_only() {
        let mut rng = StdRng::seed_from_u64(42);

        let value = generate_timestamp_range(&mut rng, "2020-01-01", "2024-12-31");

        if let GeneratedValue::Timestamp(dt) = value {
            assert!(dt.year() >= 2020 && dt.year() <= 2024);
        } else {
            panic!("Expected Timestamp value");
        }
    }

    #[test]
    fn test_unparsable_range_is_null() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            generate_timestamp_range(&mut rng, "yesterday", "tomorrow"),
            GeneratedValue::Null
        );
    }
}
