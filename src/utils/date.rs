//! Formatting of the `start` timestamp for API responses (use chrono types, not string slicing).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Output pattern for event timestamps: `YYYY-MM-DDTHH:mm:ss`, 24h, no zone suffix.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Interpret a stored timestamp value as a UTC instant.
///
/// Accepts RFC 3339 strings, naive date-time strings (taken as UTC),
/// `{seconds, nanoseconds}` objects (with or without leading underscores)
/// and integer epoch milliseconds. Returns `None` for anything else.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a stored timestamp as `YYYY-MM-DDTHH:mm:ss`.
pub fn format_start(value: &Value) -> Option<String> {
    parse_timestamp(value).map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}
