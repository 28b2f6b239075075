use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Server-assigned update time of a page or group.
///
/// The value is opaque to the client: the server may send RFC 3339 strings or
/// plain integers. Comparison follows [`Timestamp::compare`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Orders two timestamps chronologically.
    ///
    /// RFC 3339 values are compared as instants, integer values numerically,
    /// and anything else (including mixed forms) lexically.
    pub fn compare(&self, other: &Timestamp) -> Ordering {
        if let (Ok(a), Ok(b)) = (parse_rfc3339(&self.0), parse_rfc3339(&other.0)) {
            return a.cmp(&b);
        }
        if let (Ok(a), Ok(b)) = (self.0.trim().parse::<i64>(), other.0.trim().parse::<i64>()) {
            return a.cmp(&b);
        }
        self.0.cmp(&other.0)
    }

    /// Returns true if `self` is strictly later than `other`.
    pub fn is_newer_than(&self, other: &Timestamp) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim())
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => Timestamp(s),
            Wire::Signed(n) => Timestamp(n.to_string()),
            Wire::Unsigned(n) => Timestamp(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_compared_as_instants() {
        let utc = Timestamp::from("2024-01-01T10:00:00Z");
        let offset = Timestamp::from("2024-01-01T11:30:00+02:00");
        // 11:30+02:00 is 09:30Z, earlier than 10:00Z despite sorting later as text
        assert!(utc.is_newer_than(&offset));
        assert!(!offset.is_newer_than(&utc));
    }

    #[test]
    fn test_integers_compared_numerically() {
        let small = Timestamp::from("9");
        let large = Timestamp::from("10");
        assert!(large.is_newer_than(&small));
    }

    #[test]
    fn test_equal_is_not_newer() {
        let a = Timestamp::from("2024-01-01 00:00:00");
        let b = Timestamp::from("2024-01-01 00:00:00");
        assert!(!a.is_newer_than(&b));
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn test_sql_style_falls_back_to_lexical() {
        let older = Timestamp::from("2024-01-01 09:00:00");
        let newer = Timestamp::from("2024-01-02 08:00:00");
        assert!(newer.is_newer_than(&older));
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let text: Timestamp = serde_json::from_str("\"2024-01-01T00:00:00Z\"").unwrap();
        assert_eq!(text.as_str(), "2024-01-01T00:00:00Z");

        let number: Timestamp = serde_json::from_str("1704067200").unwrap();
        assert_eq!(number.as_str(), "1704067200");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let ts = Timestamp::from("2024-01-01T00:00:00Z");
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-01-01T00:00:00Z\""
        );
    }
}
