//! Per-field coercion and response scalars.
//!
//! Stored values are dynamically typed, so every field goes through an
//! explicit `Option` path: a value that cannot be coerced is absent, and an
//! absent optional field never rejects the rest of its document.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::Value;

/// Round to 2 decimal places, half away from zero (`55.555 → 55.56`).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Drop NaN and ±Infinity.
pub fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Numeric view of a stored value.  Text is parsed (so `"NaN"` and
/// `"Infinity"` come through as non-finite floats); blobs and NULL are absent.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Integer view of a stored value; fractional numbers are truncated.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Parse a stored date as a calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Midnight UTC timestamp for a stored date, e.g. `2024-01-02T00:00:00Z`.
///
/// Dates that do not parse are suffixed verbatim so the row is still emitted.
pub fn iso_midnight(date: &str) -> String {
    match parse_calendar_date(date) {
        Some(d) => format!("{}T00:00:00Z", d.format("%Y-%m-%d")),
        None => format!("{}T00:00:00Z", date.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(55.555), 55.56);
        assert_eq!(round2(55.554), 55.55);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn finite_filters_nan_and_infinity() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(f64::NEG_INFINITY)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
        assert_eq!(finite(None), None);
    }

    #[test]
    fn coerce_f64_handles_each_storage_class() {
        assert_eq!(coerce_f64(&Value::Integer(7)), Some(7.0));
        assert_eq!(coerce_f64(&Value::Real(1.25)), Some(1.25));
        assert_eq!(coerce_f64(&Value::Text(" 3.5 ".into())), Some(3.5));
        assert!(coerce_f64(&Value::Text("NaN".into())).unwrap().is_nan());
        assert_eq!(
            coerce_f64(&Value::Text("Infinity".into())),
            Some(f64::INFINITY)
        );
        assert_eq!(coerce_f64(&Value::Text("n/a".into())), None);
        assert_eq!(coerce_f64(&Value::Null), None);
        assert_eq!(coerce_f64(&Value::Blob(vec![1, 2])), None);
    }

    #[test]
    fn coerce_i64_truncates_floats() {
        assert_eq!(coerce_i64(&Value::Integer(1200)), Some(1200));
        assert_eq!(coerce_i64(&Value::Real(1200.9)), Some(1200));
        assert_eq!(coerce_i64(&Value::Text("1500".into())), Some(1500));
        assert_eq!(coerce_i64(&Value::Text("1500.7".into())), Some(1500));
        assert_eq!(coerce_i64(&Value::Real(f64::NAN)), None);
        assert_eq!(coerce_i64(&Value::Text("lots".into())), None);
    }

    #[test]
    fn parse_calendar_date_accepts_common_layouts() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_calendar_date("2024-03-01"), Some(d));
        assert_eq!(parse_calendar_date("2024-03-01T15:30:00Z"), Some(d));
        assert_eq!(parse_calendar_date("2024-03-01 09:30:00"), Some(d));
        assert_eq!(parse_calendar_date("2024-03-01T09:30:00"), Some(d));
        assert_eq!(parse_calendar_date("03/01/2024"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn iso_midnight_normalises_dates() {
        assert_eq!(iso_midnight("2024-03-01"), "2024-03-01T00:00:00Z");
        assert_eq!(iso_midnight("2024-03-01 16:00:00"), "2024-03-01T00:00:00Z");
        assert_eq!(iso_midnight("Q1"), "Q1T00:00:00Z");
    }
}
