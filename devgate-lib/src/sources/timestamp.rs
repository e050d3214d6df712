//! Coercion of source timestamps into the canonical representation.
//!
//! Timestamp integrity is not critical for the aggregated view, so anything that
//! fails to parse is replaced by the supplied `now` instead of failing the record.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an RFC 3339 / ISO 8601 timestamp, falling back to `now`.
pub fn parse_or(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(parse).unwrap_or(now)
}

/// Parse an RFC 3339 timestamp, also accepting a zone-less form taken as UTC.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Interpret seconds + nanoseconds since the Unix epoch.
pub fn from_epoch_parts(seconds: i64, nanoseconds: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, nanoseconds)
}

/// Interpret milliseconds since the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
