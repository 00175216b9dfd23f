#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renderable geometry types for the survey map.
//!
//! These are the shapes handed to the map-rendering collaborator: point
//! markers with popup content, cluster policy, heat weights and view
//! bounds. They carry no projection math; tiling and projection belong to
//! the renderer.

use serde::{Deserialize, Serialize};
use survey_map_survey_models::{Severity, SurveyId};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A square box of `half_span` degrees around a point.
    #[must_use]
    pub fn around(latitude: f64, longitude: f64, half_span: f64) -> Self {
        Self::new(
            longitude - half_span,
            latitude - half_span,
            longitude + half_span,
            latitude + half_span,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }

    /// Center point as `(latitude, longitude)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }

    /// Whether the box collapses to a single point.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        (self.east - self.west).abs() < f64::EPSILON && (self.north - self.south).abs() < f64::EPSILON
    }
}

/// A point marker for one survey with violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Survey the marker stands for.
    pub record_id: SurveyId,
    /// Ward the survey belongs to.
    pub ward_no: u32,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Plain-text popup body.
    pub popup_summary: String,
    /// Number of violations on the survey.
    pub violation_count: usize,
    /// Highest recognized severity, if any.
    pub highest_severity: Option<Severity>,
}

/// Ordered markers built from one snapshot of survey records.
///
/// Never mutated in place; a new set is built whenever the records or the
/// ward filter change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSet {
    /// Ward filter the set was built with.
    pub ward_filter: Option<u32>,
    /// Markers in input order.
    pub markers: Vec<Marker>,
}

impl MarkerSet {
    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the set holds no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterates over the markers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Tunable constants behind the zoom-dependent cluster radius.
///
/// The radius is held constant in screen pixels, so in degrees it halves
/// with every zoom step: `radius_deg = radius_px * 360 / (tile_size * 2^zoom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClusterPolicy {
    /// Cluster radius in screen pixels.
    pub radius_px: f64,
    /// Tile edge in pixels.
    pub tile_size: f64,
    /// Zoom at and above which every marker is shown on its own.
    pub disable_clustering_at_zoom: u8,
    /// Highest zoom the renderer supports.
    pub max_zoom: u8,
}

impl Default for ClusterPolicy {
    fn default() -> Self {
        Self {
            radius_px: 80.0,
            tile_size: 256.0,
            disable_clustering_at_zoom: 17,
            max_zoom: 19,
        }
    }
}

/// Clustering policy for one zoom level, consumed by the renderer's
/// cluster plugin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Zoom level the config applies to (clamped to `max_zoom`).
    pub zoom: u8,
    /// Cluster radius in screen pixels.
    pub radius_px: f64,
    /// Cluster radius in degrees at this zoom. Zero when clustering is
    /// disabled.
    pub radius_deg: f64,
    /// Whether markers should be grouped at this zoom.
    pub clustering_enabled: bool,
    /// Zoom at and above which clustering is disabled.
    pub disable_clustering_at_zoom: u8,
    /// Highest supported zoom.
    pub max_zoom: u8,
    /// Number of markers the config was computed for.
    pub marker_count: usize,
}

/// A group of nearby markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerCluster {
    /// Mean latitude of the members.
    pub latitude: f64,
    /// Mean longitude of the members.
    pub longitude: f64,
    /// Surveys in the cluster, in marker order.
    pub members: Vec<SurveyId>,
}

impl MarkerCluster {
    /// Number of markers in the cluster.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Center and zoom of the map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    /// City overview of Indore.
    fn default() -> Self {
        Self {
            latitude: 22.7196,
            longitude: 75.8577,
            zoom: 12,
        }
    }
}

/// One weighted point of a heat layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Intensity in `(0, 1]`.
    pub weight: f64,
}
