//! ISO 8601 timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp to unix milliseconds.
///
/// Accepts RFC 3339, a naive date-time (taken as UTC), or a bare date
/// (midnight UTC). Returns `None` for anything else.
pub fn parse_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Like [`parse_millis`], with unparseable values at epoch 0.
pub fn millis_or_epoch(s: &str) -> i64 {
    parse_millis(s).unwrap_or(0)
}
