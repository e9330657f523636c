//! Date/time utilities for Grove.
//!
//! Timestamps are stored by SQLite as UTC text (`YYYY-MM-DD HH:MM:SS`), which
//! sorts lexicographically in chronological order.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{GroveError, Result};

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// The database stores times in UTC, so 'Z' is appended.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}

/// Parse a date filter into the SQLite timestamp of the start of that day.
///
/// Accepts `YYYY-MM-DD` or a full RFC3339 timestamp (the UTC calendar day is
/// used).
pub fn start_of_day(input: &str) -> Result<String> {
    let input = input.trim();
    let date = match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .map_err(|_| {
                GroveError::Validation(format!("invalid date '{input}', expected YYYY-MM-DD"))
            })?,
    };

    Ok(date.format("%Y-%m-%d 00:00:00").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_start_of_day_plain_date() {
        assert_eq!(start_of_day("2024-03-05").unwrap(), "2024-03-05 00:00:00");
        assert_eq!(start_of_day(" 2024-03-05 ").unwrap(), "2024-03-05 00:00:00");
    }

    #[test]
    fn test_start_of_day_rfc3339() {
        assert_eq!(
            start_of_day("2024-03-05T23:30:00+00:00").unwrap(),
            "2024-03-05 00:00:00"
        );
        // 01:00 at +02:00 is the previous UTC day
        assert_eq!(
            start_of_day("2024-03-05T01:00:00+02:00").unwrap(),
            "2024-03-04 00:00:00"
        );
    }

    #[test]
    fn test_start_of_day_invalid() {
        assert!(matches!(
            start_of_day("yesterday"),
            Err(GroveError::Validation(_))
        ));
        assert!(start_of_day("2024-13-01").is_err());
    }
}
