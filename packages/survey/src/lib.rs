#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion of field survey records from JSON sources.
//!
//! The survey store hands back loosely-typed JSON: either a bare array of
//! survey objects or the `{ "success": true, "surveys": [...] }` envelope of
//! the surveys endpoint. Each object is converted into a typed
//! [`SurveyRecord`]. Objects missing a usable `id` or `ward_no` are reported
//! as [`MalformedRecord`]s carrying whatever status and violations they had,
//! so headline totals can still count them. A single bad record never aborts
//! the batch.

pub mod parsing;

use serde_json::Value;
use serde_json::Map;
use survey_map_survey_models::{SurveyId, SurveyRecord, SurveyTally, Violation};
use thiserror::Error;

/// Errors that abort an ingestion batch.
#[derive(Debug, Error)]
pub enum SurveyIngestError {
    /// The payload is not valid JSON.
    #[error("Invalid survey JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but holds no survey list.
    #[error("Unexpected survey payload: {message}")]
    Shape {
        /// Description of what was found instead.
        message: String,
    },
}

/// A survey object that could not be converted into a [`SurveyRecord`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Malformed survey record at index {index}: {reason}")]
pub struct MalformedRecord {
    /// Position of the object in the source list.
    pub index: usize,
    /// Identifier of the object, when it had one.
    pub id: Option<String>,
    /// What was missing or unparseable.
    pub reason: String,
    /// Status and violations read from the object. Empty when the value
    /// was not an object.
    pub tally: SurveyTally,
}

/// Outcome of ingesting a batch of survey objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Successfully converted records, in source order.
    pub records: Vec<SurveyRecord>,
    /// Objects that were skipped.
    pub malformed: Vec<MalformedRecord>,
}

/// Parses a JSON payload into survey records.
///
/// # Errors
///
/// Returns [`SurveyIngestError`] if the payload is not JSON or does not
/// contain a survey list. Individual bad records are reported in
/// [`IngestReport::malformed`] instead.
pub fn parse_records(json: &str) -> Result<IngestReport, SurveyIngestError> {
    let value: Value = serde_json::from_str(json)?;
    records_from_value(&value)
}

/// Converts an already-parsed JSON payload into survey records.
///
/// # Errors
///
/// Returns [`SurveyIngestError::Shape`] if the payload is neither an array
/// nor an object with a `surveys` array.
pub fn records_from_value(value: &Value) -> Result<IngestReport, SurveyIngestError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("surveys") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(SurveyIngestError::Shape {
                    message: "`surveys` is not an array".to_string(),
                });
            }
            None => {
                return Err(SurveyIngestError::Shape {
                    message: "object has no `surveys` field".to_string(),
                });
            }
        },
        other => {
            return Err(SurveyIngestError::Shape {
                message: format!("expected an array or object, found {}", json_kind(other)),
            });
        }
    };

    let mut report = IngestReport::default();
    for (index, item) in items.iter().enumerate() {
        match record_from_value(index, item) {
            Ok(record) => report.records.push(record),
            Err(malformed) => {
                log::warn!("{malformed}");
                report.malformed.push(malformed);
            }
        }
    }

    log::info!(
        "Ingested {} survey records ({} malformed)",
        report.records.len(),
        report.malformed.len()
    );

    Ok(report)
}

/// Converts a single survey object.
///
/// Only `id` and `ward_no` are required. Every other field is optional and
/// silently dropped when unparseable.
///
/// # Errors
///
/// Returns [`MalformedRecord`] if the value is not an object or lacks a
/// usable `id` or `ward_no`.
pub fn record_from_value(index: usize, value: &Value) -> Result<SurveyRecord, MalformedRecord> {
    let Value::Object(map) = value else {
        return Err(MalformedRecord {
            index,
            id: None,
            reason: format!("expected an object, found {}", json_kind(value)),
            tally: SurveyTally::default(),
        });
    };

    let Some(id) = parsing::opt_string(map.get("id")) else {
        return Err(MalformedRecord {
            index,
            id: None,
            reason: "missing `id`".to_string(),
            tally: tally_from_map(map),
        });
    };

    let Some(ward_no) = map.get("ward_no").and_then(parsing::parse_ward_no) else {
        return Err(MalformedRecord {
            index,
            id: Some(id),
            reason: "missing or invalid `ward_no`".to_string(),
            tally: tally_from_map(map),
        });
    };

    let SurveyTally { status, violations } = tally_from_map(map);
    let mut record = SurveyRecord::new(SurveyId::new(id), ward_no);
    record.status = status;
    record.violations = violations;

    record.survey_date = map
        .get("survey_date")
        .and_then(Value::as_str)
        .and_then(parsing::parse_survey_date);
    record.created_at = map
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parsing::parse_timestamp);
    record.coordinates = map.get("coordinates").and_then(parsing::parse_coordinates);
    if record.coordinates.is_none() && map.get("coordinates").is_some_and(|c| !c.is_null()) {
        log::debug!("Survey {} has unusable coordinates", record.id);
    }
    record.compliance_score = map.get("compliance_score").and_then(parsing::value_as_f64);
    record.drone_id = parsing::opt_string(map.get("drone_id"));
    record.ward_name = parsing::opt_string(map.get("ward_name"));
    record.survey_type = parsing::opt_string(map.get("survey_type"));

    Ok(record)
}

fn tally_from_map(map: &Map<String, Value>) -> SurveyTally {
    SurveyTally {
        status: map
            .get("status")
            .and_then(Value::as_str)
            .and_then(parsing::parse_status),
        violations: map
            .get("violations")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(violation_from_value).collect())
            .unwrap_or_default(),
    }
}

/// Converts a violation object. Non-objects are dropped; a missing type
/// becomes `"unknown"` and an unrecognized severity becomes `None`.
fn violation_from_value(value: &Value) -> Option<Violation> {
    let map = value.as_object()?;
    let kind = parsing::opt_string(map.get("type")).unwrap_or_else(|| "unknown".to_string());
    let severity = map
        .get("severity")
        .and_then(Value::as_str)
        .and_then(parsing::parse_severity);

    let mut violation = Violation::new(kind, severity);
    violation.current = parsing::opt_string(map.get("current"));
    violation.allowed = parsing::opt_string(map.get("allowed"));
    violation.building_id = parsing::opt_string(map.get("building_id"));
    violation.road_id = parsing::opt_string(map.get("road_id"));
    Some(violation)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_map_survey_models::{Severity, SurveyStatus};

    const SAMPLE: &str = r#"{
        "success": true,
        "surveys": [
            {
                "id": "SUR20250101120000abcd1234",
                "ward_no": 1,
                "survey_date": "2025-01-01",
                "created_at": "2025-01-01T12:00:00.000",
                "coordinates": {"latitude": 22.701, "longitude": 75.811},
                "status": "completed",
                "violations": [
                    {"type": "height_violation", "severity": "high", "current": "18m", "allowed": "15m", "building_id": "B-1"}
                ],
                "compliance_score": 66.67,
                "drone_id": "DRONE001"
            },
            {
                "id": "SUR2",
                "ward_no": "2",
                "coordinates": "22.72, 75.86",
                "violations": []
            },
            {"id": "SUR3"},
            {"ward_no": 4},
            "garbage"
        ]
    }"#;

    #[test]
    fn ingests_envelope_and_reports_malformed() {
        let report = parse_records(SAMPLE).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.malformed.len(), 3);
        assert_eq!(report.malformed[0].index, 2);
        assert_eq!(report.malformed[0].id.as_deref(), Some("SUR3"));
        assert_eq!(report.malformed[1].id, None);
        assert_eq!(report.malformed[2].index, 4);
    }

    #[test]
    fn malformed_records_keep_status_and_violations() {
        let report = parse_records(
            r#"[
                {"id": "A", "ward_no": 1, "status": "completed"},
                {"id": "B", "status": "pending"},
                {"ward_no": 3, "violations": [{"type": "x", "severity": "high"}]},
                7
            ]"#,
        )
        .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.malformed.len(), 3);

        assert_eq!(report.malformed[0].tally.status, Some(SurveyStatus::Pending));
        assert!(report.malformed[0].tally.violations.is_empty());

        let violations = &report.malformed[1].tally.violations;
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Some(Severity::High));

        assert_eq!(report.malformed[2].tally, SurveyTally::default());
    }

    #[test]
    fn converts_all_fields() {
        let report = parse_records(SAMPLE).unwrap();
        let first = &report.records[0];
        assert_eq!(first.id.as_str(), "SUR20250101120000abcd1234");
        assert_eq!(first.ward_no, 1);
        assert_eq!(first.status, Some(SurveyStatus::Completed));
        assert_eq!(first.violations.len(), 1);
        assert_eq!(first.violations[0].severity, Some(Severity::High));
        assert_eq!(first.violations[0].building_id.as_deref(), Some("B-1"));
        assert_eq!(first.drone_id.as_deref(), Some("DRONE001"));
        assert!(first.created_at.is_some());
        assert!(first.compliance_score.is_some());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let report = parse_records(SAMPLE).unwrap();
        let second = &report.records[1];
        assert_eq!(second.ward_no, 2);
        assert!(second.coordinates.is_some());
        assert_eq!(second.status, None);
        assert_eq!(second.survey_date, None);
        assert!(second.violations.is_empty());
    }

    #[test]
    fn accepts_bare_array() {
        let report = parse_records(r#"[{"id": "A", "ward_no": 3}]"#).unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.malformed.is_empty());
    }

    #[test]
    fn unrecognized_severity_is_kept_as_none() {
        let report = parse_records(
            r#"[{"id": "A", "ward_no": 3, "violations": [{"type": "x", "severity": "critical"}, {"severity": "low"}]}]"#,
        )
        .unwrap();
        let violations = &report.records[0].violations;
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].severity, None);
        assert_eq!(violations[1].kind, "unknown");
        assert_eq!(violations[1].severity, Some(Severity::Low));
    }

    #[test]
    fn rejects_non_list_payloads() {
        assert!(matches!(
            parse_records(r#"{"success": false}"#),
            Err(SurveyIngestError::Shape { .. })
        ));
        assert!(matches!(
            parse_records("42"),
            Err(SurveyIngestError::Shape { .. })
        ));
        assert!(matches!(
            parse_records("not json"),
            Err(SurveyIngestError::Json(_))
        ));
    }
}
