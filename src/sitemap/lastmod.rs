//! Parsing of `<lastmod>` values
//!
//! Sitemaps use W3C datetime strings in several precisions. Formats are tried
//! in order and the first one that parses wins:
//!
//! 1. ISO-8601 / W3C with offset (`2024-03-01T10:00:00+01:00`)
//! 2. Millisecond precision in UTC (`2024-03-01T10:00:00.000Z`)
//! 3. Date only (`2024-03-01`, interpreted as midnight UTC)

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Offset formats accepted besides RFC 3339
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%:z"];

const MILLISECOND_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a last-modification timestamp
///
/// Returns `None` for absent, empty or unparsable values. An unparsable date is
/// never an error.
///
/// # Examples
///
/// ```
/// use cache_warmer::sitemap::parse_last_modified;
///
/// assert!(parse_last_modified("2024-03-01T10:00:00+01:00").is_some());
/// assert!(parse_last_modified("2024-03-01").is_some());
/// assert!(parse_last_modified("yesterday").is_none());
/// ```
pub fn parse_last_modified(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, MILLISECOND_UTC_FORMAT) {
        return Some(parsed.and_utc().fixed_offset());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
}
