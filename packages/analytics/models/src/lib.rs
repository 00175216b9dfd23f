#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rollup statistics over survey records.
//!
//! All types here are derived values: recomputed from a snapshot of records
//! on demand and never persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Compliance rate reported when there is nothing to measure.
pub const DEFAULT_COMPLIANCE_RATE: u8 = 100;

/// Violation counts per recognized severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    /// Low-severity violations.
    pub low: u64,
    /// Medium-severity violations.
    pub medium: u64,
    /// High-severity violations.
    pub high: u64,
}

impl SeverityBreakdown {
    /// Sum of all three buckets.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.low + self.medium + self.high
    }
}

/// Headline statistics for a set of surveys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of surveys.
    pub total_surveys: u64,
    /// Surveys with status `completed`.
    pub completed_surveys: u64,
    /// Surveys with status `pending` or `in_progress`.
    pub pending_surveys: u64,
    /// Violations across all surveys.
    pub total_violations: u64,
    /// Violations per recognized severity.
    pub violations_by_severity: SeverityBreakdown,
    /// Violations whose severity was missing or unrecognized. These count
    /// toward `total_violations` but no severity bucket.
    pub unrecognized_severity_violations: u64,
    /// `round((surveys - violations) / surveys * 100)`, clamped to 0-100.
    pub compliance_rate: u8,
    /// The same rate before clamping. Negative when violations outnumber
    /// surveys.
    pub raw_compliance_rate: i64,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            total_surveys: 0,
            completed_surveys: 0,
            pending_surveys: 0,
            total_violations: 0,
            violations_by_severity: SeverityBreakdown::default(),
            unrecognized_severity_violations: 0,
            compliance_rate: DEFAULT_COMPLIANCE_RATE,
            raw_compliance_rate: i64::from(DEFAULT_COMPLIANCE_RATE),
        }
    }
}

impl AggregateStats {
    /// Whether the raw rate fell outside 0-100 and was clamped.
    #[must_use]
    pub fn is_clamped(&self) -> bool {
        self.raw_compliance_rate != i64::from(self.compliance_rate)
    }
}

/// Per-ward rollup, used to rank wards by compliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardSummary {
    /// Ward number.
    pub ward_no: u32,
    /// Surveys in the ward.
    pub surveys: u64,
    /// Violations in the ward.
    pub violations: u64,
    /// Clamped compliance rate of the ward.
    pub compliance_rate: u8,
    /// Date of the most recent survey, when any survey carried a date.
    pub last_survey_date: Option<NaiveDate>,
}

/// Activity within a trailing time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    /// Start of the window (inclusive).
    pub since: NaiveDateTime,
    /// End of the window (inclusive).
    pub until: NaiveDateTime,
    /// Surveys created within the window.
    pub surveys: u64,
    /// Violations on those surveys.
    pub violations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_report_full_compliance() {
        let stats = AggregateStats::default();
        assert_eq!(stats.compliance_rate, 100);
        assert!(!stats.is_clamped());
    }

    #[test]
    fn stats_serialize_camel_case() {
        let json = serde_json::to_value(AggregateStats::default()).unwrap();
        assert!(json.get("totalSurveys").is_some());
        assert!(json.get("violationsBySeverity").is_some());
        assert!(json.get("complianceRate").is_some());
    }
}
