//! Date normalization for the loosely-shaped values the market-data
//! provider returns: epoch seconds, free-form strings, nulls, or NaN
//! placeholders. Anything unparseable degrades to `None`, never an error.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

const STRING_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Convert a raw provider value into a calendar date, if possible.
///
/// Numbers are epoch seconds rendered in the local zone; strings are tried
/// against a small set of formats. Nulls, NaN placeholders and unparseable
/// strings all yield `None`.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            let secs = n.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            date_from_epoch(secs as i64)
        }
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Epoch seconds to the local calendar date.
pub fn date_from_epoch(secs: i64) -> Option<NaiveDate> {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.date_naive())
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in STRING_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    tracing::debug!(value = s, "unparseable date value, treating as absent");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_non_date_shapes_yield_none() {
        assert_eq!(normalize_date(&Value::Null), None);
        assert_eq!(normalize_date(&json!(true)), None);
        assert_eq!(normalize_date(&json!(["2024-01-01"])), None);
        assert_eq!(normalize_date(&json!({"date": "2024-01-01"})), None);
        // serde_json renders NaN as null, so the NaN sentinel lands here too.
        assert_eq!(normalize_date(&Value::from(f64::NAN)), None);
    }

    #[test]
    fn epoch_seconds_become_the_local_calendar_date() {
        let ts: i64 = 1_717_200_000;
        let expected = Local
            .timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.date_naive());
        assert_eq!(normalize_date(&json!(ts)), expected);
        assert!(normalize_date(&json!(ts)).is_some());
    }

    #[test]
    fn iso_and_verbose_strings_parse() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(normalize_date(&json!("2024-06-01")), Some(d));
        assert_eq!(normalize_date(&json!(" 2024-06-01 ")), Some(d));
        assert_eq!(normalize_date(&json!("Jun 01, 2024")), Some(d));
        assert_eq!(normalize_date(&json!("2024-06-01 14:30:00")), Some(d));
        assert_eq!(normalize_date(&json!("2024-06-01T14:30:00")), Some(d));
        assert_eq!(normalize_date(&json!("2024-06-01T14:30:00+02:00")), Some(d));
    }

    #[test]
    fn malformed_strings_degrade_to_none_without_panicking() {
        assert_eq!(normalize_date(&json!("")), None);
        assert_eq!(normalize_date(&json!("not a date")), None);
        assert_eq!(normalize_date(&json!("2024-13-45")), None);
    }
}
