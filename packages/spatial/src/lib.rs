#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map geometry for survey records.
//!
//! Turns survey records into point markers, derives zoom-dependent cluster
//! policy and heat weights, and computes the bounds a viewport should fit.
//! No projection math happens here; the renderer behind [`MapRenderer`]
//! owns tiles and screen space.

pub mod cluster;
pub mod render;

use geo::{BoundingRect, MultiPoint, Point};
use survey_map_spatial_models::{
    BoundingBox, ClusterConfig, ClusterPolicy, HeatPoint, Marker, MarkerSet,
};
use survey_map_survey_models::SurveyRecord;

pub use cluster::cluster_markers;
pub use render::{GeoJsonRenderer, MapRenderer, render, reset_view};

/// Builds markers for every record that has valid coordinates and at least
/// one violation, optionally restricted to one ward.
///
/// Records with absent or invalid coordinates are skipped and logged at
/// `debug`. Input order is preserved.
#[must_use]
pub fn build_markers(records: &[SurveyRecord], ward_filter: Option<u32>) -> MarkerSet {
    let markers = records
        .iter()
        .filter(|record| ward_filter.is_none_or(|ward| record.ward_no == ward))
        .filter(|record| record.has_violations())
        .filter_map(|record| {
            let Some(coordinates) = record.valid_coordinates() else {
                log::debug!(
                    "Survey {} has violations but no usable coordinates; not mapped",
                    record.id
                );
                return None;
            };

            Some(Marker {
                record_id: record.id.clone(),
                ward_no: record.ward_no,
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
                popup_summary: popup_summary(record),
                violation_count: record.violations.len(),
                highest_severity: record.highest_severity(),
            })
        })
        .collect();

    MarkerSet {
        ward_filter,
        markers,
    }
}

/// Plain-text popup body for a survey marker.
#[must_use]
pub fn popup_summary(record: &SurveyRecord) -> String {
    let date = record
        .survey_date
        .map_or_else(|| "N/A".to_string(), |date| date.to_string());

    format!(
        "Survey {}\nWard: {}\nViolations: {}\nDate: {}\nCompliance: {}%",
        record.id,
        record.ward_no,
        record.violations.len(),
        date,
        format_score(record.effective_compliance_score()),
    )
}

fn format_score(score: f64) -> String {
    if (score - score.round()).abs() < f64::EPSILON {
        format!("{score:.0}")
    } else {
        format!("{score:.2}")
    }
}

/// Cluster policy for `zoom`.
///
/// The radius is constant in screen pixels, so in degrees it shrinks by
/// half with every zoom step. At or above the policy's
/// `disable_clustering_at_zoom` every marker stands alone and the radius is
/// zero. Zoom is clamped to the policy's `max_zoom`.
#[must_use]
pub fn cluster_hint(markers: &MarkerSet, zoom: u8, policy: &ClusterPolicy) -> ClusterConfig {
    let zoom = zoom.min(policy.max_zoom);
    let clustering_enabled = zoom < policy.disable_clustering_at_zoom;
    let radius_deg = if clustering_enabled {
        policy.radius_px * 360.0 / (policy.tile_size * f64::from(zoom).exp2())
    } else {
        0.0
    };

    ClusterConfig {
        zoom,
        radius_px: policy.radius_px,
        radius_deg,
        clustering_enabled,
        disable_clustering_at_zoom: policy.disable_clustering_at_zoom,
        max_zoom: policy.max_zoom,
        marker_count: markers.len(),
    }
}

/// One heat point per marker.
///
/// The raw intensity is the violation count times the weight of the
/// highest recognized severity (1 when none is recognized). Intensities
/// are normalized by the largest one, so every weight lies in `(0, 1]`.
#[must_use]
pub fn heat_layer(markers: &MarkerSet) -> Vec<HeatPoint> {
    let intensity = |marker: &Marker| {
        let severity = marker.highest_severity.map_or(1, |s| s.weight());
        #[allow(clippy::cast_precision_loss)]
        let count = marker.violation_count.max(1) as f64;
        count * f64::from(severity)
    };

    let max = markers.iter().map(intensity).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }

    markers
        .iter()
        .map(|marker| HeatPoint {
            latitude: marker.latitude,
            longitude: marker.longitude,
            weight: intensity(marker) / max,
        })
        .collect()
}

/// Smallest box containing every marker, or `None` for an empty set.
#[must_use]
pub fn fit_bounds(markers: &MarkerSet) -> Option<BoundingBox> {
    let points: MultiPoint<f64> = markers
        .iter()
        .map(|marker| Point::new(marker.longitude, marker.latitude))
        .collect();

    points.bounding_rect().map(|rect| {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    })
}
