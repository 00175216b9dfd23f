#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative ward catalog types.
//!
//! Defines the TOML schema of a ward catalog and the resolved [`WardRef`]
//! handed to callers after a successful lookup.

use serde::{Deserialize, Serialize};
use survey_map_spatial_models::BoundingBox;
use survey_map_survey_models::Coordinates;

/// A ward catalog, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardCatalog {
    /// Catalog identifier (e.g. `"indore"`).
    pub name: String,
    /// Wards in index order.
    #[serde(default)]
    pub wards: Vec<Ward>,
}

/// One administrative ward.
///
/// Names are not unique: historical renames leave several entries with the
/// same name. The index is the stable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    /// 1-based ward number.
    pub index: u32,
    /// Display name.
    pub name: String,
    /// Centroid latitude.
    pub latitude: f64,
    /// Centroid longitude.
    pub longitude: f64,
}

impl Ward {
    /// Centroid as a coordinate pair.
    #[must_use]
    pub const fn centroid(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A resolved ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardRef {
    /// Canonical identifier (e.g. `"ward-12"`).
    pub id: String,
    /// 1-based ward number.
    pub number: u32,
    /// Display name.
    pub name: String,
    /// Centroid.
    pub centroid: Coordinates,
    /// Reference box around the centroid, used for view fitting.
    pub bounds: BoundingBox,
}

/// Canonical identifier for a ward number.
#[must_use]
pub fn ward_id(number: u32) -> String {
    format!("ward-{number}")
}
