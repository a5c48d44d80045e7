//! Generated values and their staging representation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A value produced by a generator, before it is written to staging.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Decimal kept as its formatted text
    Decimal(String),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl GeneratedValue {
    /// Text stored in the staging table (`None` for NULL).
    ///
    /// Booleans are stored as `true`/`false` and timestamps as RFC 3339, which
    /// is what the external system accepts on load.
    pub fn into_staged_text(self) -> Option<String> {
        match self {
            GeneratedValue::Null => None,
            GeneratedValue::Bool(b) => Some(b.to_string()),
            GeneratedValue::Int(i) => Some(i.to_string()),
            GeneratedValue::Float(f) => Some(f.to_string()),
            GeneratedValue::Decimal(s) | GeneratedValue::Text(s) => Some(s),
            GeneratedValue::Uuid(u) => Some(u.to_string()),
            GeneratedValue::Timestamp(dt) => Some(dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_text() {
        assert_eq!(GeneratedValue::Null.into_staged_text(), None);
        assert_eq!(
            GeneratedValue::Bool(true).into_staged_text().as_deref(),
            Some("true")
        );
        assert_eq!(
            GeneratedValue::Int(-4).into_staged_text().as_deref(),
            Some("-4")
        );
        assert_eq!(
            GeneratedValue::Decimal("12.50".to_string())
                .into_staged_text()
                .as_deref(),
            Some("12.50")
        );

        let dt = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            GeneratedValue::Timestamp(dt).into_staged_text().as_deref(),
            Some("2024-01-02T03:04:05+00:00")
        );
    }
}
