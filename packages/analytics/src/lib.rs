#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Survey rollups.
//!
//! Every function here is a pure fold over a snapshot of survey records.
//! The result does not depend on record order, so callers may recompute
//! freely from any thread.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use survey_map_analytics_models::{AggregateStats, DEFAULT_COMPLIANCE_RATE, RecentActivity, WardSummary};
use survey_map_survey_models::{Severity, SurveyRecord, SurveyStatus, SurveyTally, Violation};

/// Trailing window used by the dashboards for recent activity.
pub const DEFAULT_ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Computes headline statistics.
///
/// A record without a status counts toward `total_surveys` only. A
/// violation with an unrecognized severity counts toward
/// `total_violations` and `unrecognized_severity_violations` but no
/// severity bucket.
#[must_use]
pub fn aggregate(records: &[SurveyRecord]) -> AggregateStats {
    aggregate_with_malformed(records, &[])
}

/// [`aggregate`] that also counts survey objects rejected at ingestion.
///
/// Each tally adds one survey, its status and its violations to the
/// totals. Per-ward and spatial views never see them.
#[must_use]
pub fn aggregate_with_malformed(records: &[SurveyRecord], malformed: &[&SurveyTally]) -> AggregateStats {
    let mut stats = AggregateStats::default();

    for record in records {
        count_survey(&mut stats, record.status, &record.violations);
    }
    for tally in malformed {
        count_survey(&mut stats, tally.status, &tally.violations);
    }

    let (rate, raw) = compliance_rate(stats.total_surveys, stats.total_violations);
    stats.compliance_rate = rate;
    stats.raw_compliance_rate = raw;

    if stats.is_clamped() {
        log::debug!(
            "Compliance rate {raw} clamped to {rate} ({} violations over {} surveys)",
            stats.total_violations,
            stats.total_surveys
        );
    }

    stats
}

fn count_survey(stats: &mut AggregateStats, status: Option<SurveyStatus>, violations: &[Violation]) {
    stats.total_surveys += 1;
    match status {
        Some(SurveyStatus::Completed) => stats.completed_surveys += 1,
        Some(status) if status.is_open() => stats.pending_surveys += 1,
        _ => {}
    }

    for violation in violations {
        stats.total_violations += 1;
        match violation.severity {
            Some(Severity::Low) => stats.violations_by_severity.low += 1,
            Some(Severity::Medium) => stats.violations_by_severity.medium += 1,
            Some(Severity::High) => stats.violations_by_severity.high += 1,
            None => stats.unrecognized_severity_violations += 1,
        }
    }
}

/// `round((surveys - violations) / surveys * 100)` as `(clamped, raw)`.
///
/// Halves round toward positive infinity, so a raw rate of -12.5 becomes
/// -12. Zero surveys yields 100 for both.
#[must_use]
pub fn compliance_rate(surveys: u64, violations: u64) -> (u8, i64) {
    if surveys == 0 {
        return (
            DEFAULT_COMPLIANCE_RATE,
            i64::from(DEFAULT_COMPLIANCE_RATE),
        );
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let raw = ((surveys as f64 - violations as f64) / surveys as f64)
        .mul_add(100.0, 0.5)
        .floor() as i64;
    let clamped = u8::try_from(raw.clamp(0, i64::from(DEFAULT_COMPLIANCE_RATE)))
        .unwrap_or(DEFAULT_COMPLIANCE_RATE);

    (clamped, raw)
}

/// Per-ward rollups, worst compliance first.
///
/// Ties are broken by ward number.
#[must_use]
pub fn ward_summaries(records: &[SurveyRecord]) -> Vec<WardSummary> {
    let mut by_ward: BTreeMap<u32, WardSummary> = BTreeMap::new();

    for record in records {
        let summary = by_ward.entry(record.ward_no).or_insert_with(|| WardSummary {
            ward_no: record.ward_no,
            surveys: 0,
            violations: 0,
            compliance_rate: DEFAULT_COMPLIANCE_RATE,
            last_survey_date: None,
        });
        summary.surveys += 1;
        summary.violations += record.violations.len() as u64;
        summary.last_survey_date = summary.last_survey_date.max(record.survey_date);
    }

    let mut summaries: Vec<WardSummary> = by_ward
        .into_values()
        .map(|mut summary| {
            summary.compliance_rate = compliance_rate(summary.surveys, summary.violations).0;
            summary
        })
        .collect();

    summaries.sort_by_key(|summary| (summary.compliance_rate, summary.ward_no));
    summaries
}

/// Violations per ward number.
///
/// Wards with surveys but no violations appear with a count of zero.
#[must_use]
pub fn ward_violation_distribution(records: &[SurveyRecord]) -> BTreeMap<u32, u64> {
    let mut distribution = BTreeMap::new();
    for record in records {
        *distribution.entry(record.ward_no).or_insert(0) += record.violations.len() as u64;
    }
    distribution
}

/// Surveys and violations within `window` before `now`.
///
/// A record is placed in time by its `created_at`, falling back to the
/// start of its survey date. Records with neither are ignored.
#[must_use]
pub fn recent_activity(records: &[SurveyRecord], now: NaiveDateTime, window: Duration) -> RecentActivity {
    let since = now - window;
    let mut activity = RecentActivity {
        since,
        until: now,
        surveys: 0,
        violations: 0,
    };

    for record in records {
        let Some(timestamp) = record
            .created_at
            .or_else(|| record.survey_date.and_then(|date| date.and_hms_opt(0, 0, 0)))
        else {
            continue;
        };

        if (since..=now).contains(&timestamp) {
            activity.surveys += 1;
            activity.violations += record.violations.len() as u64;
        }
    }

    activity
}

/// [`recent_activity`] over the default seven-day window.
#[must_use]
pub fn recent_activity_default(records: &[SurveyRecord], now: NaiveDateTime) -> RecentActivity {
    recent_activity(records, now, Duration::days(DEFAULT_ACTIVITY_WINDOW_DAYS))
}
