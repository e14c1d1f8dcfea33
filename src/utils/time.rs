//! Timestamp helpers.
//!
//! Every timestamp column holds UTC RFC 3339 with second precision and a `Z`
//! suffix, so comparing the strings in SQL compares the instants.

use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_ts() -> String {
    format_ts(Utc::now())
}

/// Parse any RFC 3339 timestamp (any offset) into UTC.
pub fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize a client-supplied timestamp into the stored form.
pub fn normalize_ts(value: &str) -> Option<String> {
    parse_ts(value).map(format_ts)
}
