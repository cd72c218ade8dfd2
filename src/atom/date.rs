//! Timestamp formatting and parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Wire format of every timestamp written: UTC, second precision, literal `Z`.
pub const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(WRITE_FORMAT).to_string()
}

/// Parses a timestamp, accepting more than RFC 3339 requires.
///
/// Tried in order: RFC 3339, RFC 2822, offset-less date-times (taken as UTC),
/// bare dates (midnight UTC). Surrounding whitespace is ignored.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}
