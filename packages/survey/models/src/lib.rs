#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field survey and violation record types.
//!
//! A [`SurveyRecord`] is one field inspection of a ward, optionally pinned
//! to a coordinate pair, carrying the [`Violation`]s that were flagged
//! during the inspection. Violations have no lifecycle of their own; they
//! are owned by (and dropped with) their survey.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Compliance score of a survey with no violations.
pub const FULL_COMPLIANCE: f64 = 100.0;

/// Score deducted per violation when a survey carries no explicit score.
pub const SCORE_PENALTY_PER_VIOLATION: f64 = 10.0;

/// Prefix of generated survey identifiers.
pub const SURVEY_ID_PREFIX: &str = "SUR";

/// Severity of a single violation.
///
/// Ordered so that `High` compares greater than `Medium` and `Low`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Severity {
    /// Minor deviation from the permitted value
    Low,
    /// Significant deviation
    Medium,
    /// Deviation requiring priority action
    High,
}

impl Severity {
    /// Returns all variants, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }

    /// Relative weight used when building heat surfaces (1-3).
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

/// Lifecycle status of a survey.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SurveyStatus {
    /// Scheduled but not started
    Pending,
    /// Field work underway
    InProgress,
    /// Field work and analysis finished
    Completed,
}

impl SurveyStatus {
    /// Whether the survey still counts as outstanding work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are finite and inside the
    /// WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Unique survey identifier, assigned when the survey is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(String);

impl SurveyId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier of the form `SUR<yyyymmddHHMMSS><8 hex>`.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(chrono::Local::now().naive_local())
    }

    /// Generates an identifier stamped with the given creation time.
    #[must_use]
    pub fn generate_at(created_at: NaiveDateTime) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!(
            "{SURVEY_ID_PREFIX}{}{}",
            created_at.format("%Y%m%d%H%M%S"),
            &suffix[..8]
        ))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SurveyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A flagged non-compliance item attached to a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Free-form category tag (e.g. `"height_violation"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Recognized severity. `None` when the source value was missing or
    /// outside `low`/`medium`/`high`.
    pub severity: Option<Severity>,
    /// Measured value, as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// Permitted value, as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<String>,
    /// Building the violation was found on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    /// Road the violation was found on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_id: Option<String>,
}

impl Violation {
    /// Creates a violation with no detail fields.
    #[must_use]
    pub fn new(kind: impl Into<String>, severity: Option<Severity>) -> Self {
        Self {
            kind: kind.into(),
            severity,
            current: None,
            allowed: None,
            building_id: None,
            road_id: None,
        }
    }
}

/// One field inspection of a ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    /// Unique identifier.
    pub id: SurveyId,
    /// 1-based ward number.
    pub ward_no: u32,
    /// Date the survey was carried out.
    pub survey_date: Option<NaiveDate>,
    /// When the record was created in the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Where the survey was taken, if known.
    pub coordinates: Option<Coordinates>,
    /// Lifecycle status. `None` when missing or unrecognized.
    pub status: Option<SurveyStatus>,
    /// Violations flagged during the survey.
    #[serde(default)]
    pub violations: Vec<Violation>,
    /// Explicit compliance score override (0-100).
    pub compliance_score: Option<f64>,
    /// Drone used for the survey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drone_id: Option<String>,
    /// Display name of the ward as recorded by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    /// Kind of survey (drone, manual, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_type: Option<String>,
}

impl SurveyRecord {
    /// Creates a record with only the required fields set.
    #[must_use]
    pub const fn new(id: SurveyId, ward_no: u32) -> Self {
        Self {
            id,
            ward_no,
            survey_date: None,
            created_at: None,
            coordinates: None,
            status: None,
            violations: Vec::new(),
            compliance_score: None,
            drone_id: None,
            ward_name: None,
            survey_type: None,
        }
    }

    /// Sets the coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: SurveyStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the survey date.
    #[must_use]
    pub const fn with_survey_date(mut self, date: NaiveDate) -> Self {
        self.survey_date = Some(date);
        self
    }

    /// Appends a violation.
    #[must_use]
    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }

    /// Whether any violation was flagged.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// The highest recognized severity among the violations.
    #[must_use]
    pub fn highest_severity(&self) -> Option<Severity> {
        self.violations.iter().filter_map(|v| v.severity).max()
    }

    /// Compliance score used for display and ranking.
    ///
    /// An explicit score wins (clamped to 0-100). Otherwise a survey with
    /// no violations scores 100 and each violation deducts
    /// [`SCORE_PENALTY_PER_VIOLATION`], floored at 0.
    #[must_use]
    pub fn effective_compliance_score(&self) -> f64 {
        if let Some(score) = self.compliance_score
            && score.is_finite()
        {
            return score.clamp(0.0, FULL_COMPLIANCE);
        }

        #[allow(clippy::cast_precision_loss)]
        let penalty = self.violations.len() as f64 * SCORE_PENALTY_PER_VIOLATION;
        (FULL_COMPLIANCE - penalty).max(0.0)
    }

    /// Valid coordinates, if present.
    #[must_use]
    pub fn valid_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_valid)
    }
}

/// Status and violations of a survey object that could not become a
/// [`SurveyRecord`]. Headline totals still count it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyTally {
    /// Lifecycle status, if recognized.
    pub status: Option<SurveyStatus>,
    /// Violations flagged on the object.
    #[serde(default)]
    pub violations: Vec<Violation>,
}
