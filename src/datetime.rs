//! Date/time utilities for Dropshare.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a SQLite datetime string (stored as UTC) to RFC3339.
///
/// Values that are already RFC3339 are returned normalized to UTC.
/// Unparseable values are returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    }

    match NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => naive
            .and_utc()
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        Err(_) => datetime_str.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rfc3339_sqlite_format() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_to_rfc3339_already_rfc3339() {
        assert_eq!(
            to_rfc3339("2024-01-15T19:30:00+09:00"),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn test_to_rfc3339_invalid() {
        assert_eq!(to_rfc3339("yesterday"), "yesterday");
    }
}
