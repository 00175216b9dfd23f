//! Shared parsing utilities for loosely-typed survey JSON.
//!
//! Survey sources are not consistent about types: ward numbers arrive as
//! numbers or numeric strings, coordinates as objects or `"lat, lng"`
//! strings, dates with or without a time component. These helpers accept
//! every shape seen in practice and return `None` for anything else.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use survey_map_survey_models::{Coordinates, Severity, SurveyStatus};

/// Parses a ward number from a JSON number or numeric string. Zero and
/// negative values are rejected.
#[must_use]
pub fn parse_ward_no(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(f64_to_u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn f64_to_u64(f: f64) -> u64 {
    f as u64
}

/// Reads a JSON number or numeric string as `f64`.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parses lat/lng from optional f64 fields. Returns `None` if missing,
/// non-finite, out of range, or exactly `(0, 0)`.
#[must_use]
pub fn parse_lat_lng_f64(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    let latitude = lat?;
    let longitude = lng?;
    if latitude == 0.0 && longitude == 0.0 {
        return None;
    }
    Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_valid)
}

/// Parses a `"lat, lng"` string.
#[must_use]
pub fn parse_lat_lng_str(s: &str) -> Option<Coordinates> {
    let (lat, lng) = s.split_once(',')?;
    parse_lat_lng_f64(lat.trim().parse().ok(), lng.trim().parse().ok())
}

/// Parses coordinates from either an object (`latitude`/`longitude`, or
/// the short `lat`/`lng` keys) or a `"lat, lng"` string.
#[must_use]
pub fn parse_coordinates(value: &Value) -> Option<Coordinates> {
    match value {
        Value::Object(map) => {
            let lat = map.get("latitude").or_else(|| map.get("lat"));
            let lng = map
                .get("longitude")
                .or_else(|| map.get("lng"))
                .or_else(|| map.get("lon"));
            parse_lat_lng_f64(lat.and_then(value_as_f64), lng.and_then(value_as_f64))
        }
        Value::String(s) => parse_lat_lng_str(s),
        _ => None,
    }
}

/// Parses a survey date. Accepts `YYYY-MM-DD` and ISO 8601 datetimes (the
/// date part is kept).
#[must_use]
pub fn parse_survey_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    parse_timestamp(s).map(|dt| dt.date())
}

/// Parses an ISO 8601 timestamp with optional fractional seconds.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Parses a severity tag, ignoring case and surrounding whitespace.
#[must_use]
pub fn parse_severity(s: &str) -> Option<Severity> {
    s.trim().parse().ok()
}

/// Parses a status tag. Also accepts the display forms used by the
/// dashboards (`"In Progress"`, `"in-progress"`).
#[must_use]
pub fn parse_status(s: &str) -> Option<SurveyStatus> {
    let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    normalized.parse().ok()
}

/// Reads an optional string field, converting numbers to their display
/// form and treating empty strings as absent.
#[must_use]
pub fn opt_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ward_no_from_number_and_string() {
        assert_eq!(parse_ward_no(&json!(12)), Some(12));
        assert_eq!(parse_ward_no(&json!("7")), Some(7));
        assert_eq!(parse_ward_no(&json!(" 3 ")), Some(3));
        assert_eq!(parse_ward_no(&json!(4.0)), Some(4));
    }

    #[test]
    fn rejects_invalid_ward_no() {
        assert_eq!(parse_ward_no(&json!(0)), None);
        assert_eq!(parse_ward_no(&json!(-2)), None);
        assert_eq!(parse_ward_no(&json!(2.5)), None);
        assert_eq!(parse_ward_no(&json!("Ward 5")), None);
        assert_eq!(parse_ward_no(&json!(null)), None);
    }

    #[test]
    fn parses_coordinate_object() {
        let c = parse_coordinates(&json!({"latitude": 22.701, "longitude": 75.811})).unwrap();
        assert!((c.latitude - 22.701).abs() < f64::EPSILON);
        assert!((c.longitude - 75.811).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_coordinate_object_with_string_components() {
        let c = parse_coordinates(&json!({"lat": "22.7", "lng": "75.8"})).unwrap();
        assert!((c.latitude - 22.7).abs() < f64::EPSILON);
        assert!((c.longitude - 75.8).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_coordinate_string() {
        let c = parse_coordinates(&json!("22.7196, 75.8577")).unwrap();
        assert!((c.latitude - 22.7196).abs() < f64::EPSILON);
        assert!((c.longitude - 75.8577).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_and_out_of_range_coordinates() {
        assert!(parse_coordinates(&json!({"latitude": 0.0, "longitude": 0.0})).is_none());
        assert!(parse_coordinates(&json!("0, 0")).is_none());
        assert!(parse_coordinates(&json!({"latitude": 91.0, "longitude": 75.8})).is_none());
        assert!(parse_coordinates(&json!("28.7041°N, 77.1025°E")).is_none());
        assert!(parse_coordinates(&json!({"latitude": 22.7})).is_none());
    }

    #[test]
    fn keeps_points_on_the_equator_and_prime_meridian() {
        let equator = parse_coordinates(&json!({"latitude": 0.0, "longitude": 75.8})).unwrap();
        assert!(equator.latitude.abs() < f64::EPSILON);
        let meridian = parse_coordinates(&json!("51.4779, 0")).unwrap();
        assert!(meridian.longitude.abs() < f64::EPSILON);
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_survey_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_survey_date("2024-01-15T14:30:00.123"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert!(parse_survey_date("15/01/2024").is_none());
    }

    #[test]
    fn parses_timestamps() {
        let dt = parse_timestamp("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
        let dt = parse_timestamp("2024-01-15T14:30:00+05:30").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 09:00:00");
    }

    #[test]
    fn parses_status_display_forms() {
        assert_eq!(parse_status("In Progress"), Some(SurveyStatus::InProgress));
        assert_eq!(parse_status("in-progress"), Some(SurveyStatus::InProgress));
        assert_eq!(parse_status("COMPLETED"), Some(SurveyStatus::Completed));
        assert_eq!(parse_status("Scheduled"), None);
    }

    #[test]
    fn parses_severity_loosely() {
        assert_eq!(parse_severity(" High "), Some(Severity::High));
        assert_eq!(parse_severity("severe"), None);
    }
}
