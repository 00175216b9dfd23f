//! The map-rendering collaborator.
//!
//! [`MapRenderer`] is the narrow surface the engine needs from a map
//! widget. [`render`] drives one through a full redraw, and
//! [`GeoJsonRenderer`] is a renderer that records the drawn layers as a
//! `GeoJSON` `FeatureCollection` for tooling and export.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value, feature::Id};
use survey_map_spatial_models::{BoundingBox, HeatPoint, MapView, Marker, MarkerSet};

/// Operations a map widget must support to display survey geometry.
pub trait MapRenderer {
    /// Draws one marker with its popup.
    fn add_marker(&mut self, marker: &Marker);

    /// Replaces the heat overlay.
    fn set_heat_layer(&mut self, points: &[HeatPoint]);

    /// Moves the viewport so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: &BoundingBox);

    /// Removes every marker and the heat overlay.
    fn remove_all(&mut self);
}

/// Redraws `renderer` from scratch.
///
/// Clears the map, adds every marker, sets the heat overlay when `heat` is
/// non-empty and fits the viewport to the markers when there are any.
pub fn render<R: MapRenderer + ?Sized>(renderer: &mut R, markers: &MarkerSet, heat: &[HeatPoint]) {
    renderer.remove_all();

    for marker in markers {
        renderer.add_marker(marker);
    }

    if !heat.is_empty() {
        renderer.set_heat_layer(heat);
    }

    match crate::fit_bounds(markers) {
        Some(bounds) => renderer.fit_bounds(&bounds),
        None => log::debug!("No markers to fit; leaving viewport unchanged"),
    }
}

/// Clears the map and returns the city overview it should return to.
pub fn reset_view<R: MapRenderer + ?Sized>(renderer: &mut R) -> MapView {
    renderer.remove_all();
    MapView::default()
}

/// Renderer that collects drawn layers as `GeoJSON` features.
///
/// Markers become `Point` features with `kind = "marker"`; heat points
/// become `Point` features with `kind = "heat"` and a `weight`. The last
/// fitted bounds are emitted as the collection's `bbox`.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonRenderer {
    markers: Vec<Feature>,
    heat: Vec<Feature>,
    bounds: Option<BoundingBox>,
}

impl GeoJsonRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marker features drawn.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Number of heat features drawn.
    #[must_use]
    pub fn heat_count(&self) -> usize {
        self.heat.len()
    }

    /// Last fitted bounds.
    #[must_use]
    pub const fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Snapshot of the drawn layers, markers first.
    #[must_use]
    pub fn feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: self
                .bounds
                .map(|b| vec![b.west, b.south, b.east, b.north]),
            features: self.markers.iter().chain(&self.heat).cloned().collect(),
            foreign_members: None,
        }
    }

    /// Serializes the drawn layers as a `GeoJSON` string.
    #[must_use]
    pub fn to_geojson_string(&self) -> String {
        GeoJson::from(self.feature_collection()).to_string()
    }
}

impl MapRenderer for GeoJsonRenderer {
    fn add_marker(&mut self, marker: &Marker) {
        let mut properties = JsonObject::new();
        properties.insert("kind".to_string(), "marker".into());
        properties.insert("wardNo".to_string(), marker.ward_no.into());
        properties.insert("popup".to_string(), marker.popup_summary.clone().into());
        properties.insert("violationCount".to_string(), marker.violation_count.into());
        if let Some(severity) = marker.highest_severity {
            properties.insert("highestSeverity".to_string(), severity.to_string().into());
        }

        self.markers.push(Feature {
            bbox: None,
            geometry: Some(point(marker.latitude, marker.longitude)),
            id: Some(Id::String(marker.record_id.to_string())),
            properties: Some(properties),
            foreign_members: None,
        });
    }

    fn set_heat_layer(&mut self, points: &[HeatPoint]) {
        self.heat = points
            .iter()
            .map(|heat| {
                let mut properties = JsonObject::new();
                properties.insert("kind".to_string(), "heat".into());
                properties.insert("weight".to_string(), heat.weight.into());

                Feature {
                    bbox: None,
                    geometry: Some(point(heat.latitude, heat.longitude)),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox) {
        self.bounds = Some(*bounds);
    }

    fn remove_all(&mut self) {
        self.markers.clear();
        self.heat.clear();
    }
}

fn point(latitude: f64, longitude: f64) -> Geometry {
    Geometry::new(Value::Point(vec![longitude, latitude]))
}
