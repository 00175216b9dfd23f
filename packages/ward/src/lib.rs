#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only ward registry.
//!
//! Loads a ward catalog once at startup and resolves ward numbers and names
//! to a canonical [`WardRef`]. The registry exposes no mutation; share it
//! freely across threads once built.
//!
//! Catalog problems are hard errors ([`WardCatalogError`]) raised before
//! any lookup is served. Lookup misses are ordinary, user-correctable
//! results ([`WardError::NotFound`]).

pub mod catalog;

use survey_map_spatial_models::BoundingBox;
use survey_map_survey_models::Coordinates;
use survey_map_ward_models::{Ward, WardCatalog, WardRef, ward_id};
use thiserror::Error;

/// Half-width in degrees of the reference box around a ward centroid.
pub const DEFAULT_WARD_HALF_SPAN_DEG: f64 = 0.005;

/// Errors that prevent a catalog from being loaded.
#[derive(Debug, Error)]
pub enum WardCatalogError {
    /// The catalog TOML could not be parsed.
    #[error("Failed to parse ward catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// The requested embedded catalog does not exist.
    #[error("Unknown ward catalog '{name}'")]
    UnknownCatalog {
        /// Requested catalog name.
        name: String,
    },

    /// The catalog holds no wards.
    #[error("Ward catalog '{name}' is empty")]
    Empty {
        /// Catalog name.
        name: String,
    },

    /// Ward indices are not `1..=N` in order.
    #[error("Ward catalog '{name}': expected index {expected}, found {found}")]
    NonContiguous {
        /// Catalog name.
        name: String,
        /// Index that should have appeared.
        expected: u32,
        /// Index that did appear.
        found: u32,
    },

    /// A centroid lies outside WGS84 ranges.
    #[error("Ward catalog '{name}': ward {index} has an invalid centroid")]
    InvalidCentroid {
        /// Catalog name.
        name: String,
        /// Offending ward index.
        index: u32,
    },
}

/// Ward lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardError {
    /// No ward matches the query.
    #[error("Ward not found: {query}")]
    NotFound {
        /// Human-readable description of the query.
        query: String,
    },
}

/// Immutable, validated ward catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct WardRegistry {
    name: String,
    wards: Vec<Ward>,
    half_span_deg: f64,
}

impl WardRegistry {
    /// Loads the default embedded catalog.
    ///
    /// # Errors
    ///
    /// Returns [`WardCatalogError`] if the embedded catalog is invalid.
    pub fn embedded() -> Result<Self, WardCatalogError> {
        Self::embedded_named(catalog::DEFAULT_CATALOG)
    }

    /// Loads an embedded catalog by name.
    ///
    /// # Errors
    ///
    /// Returns [`WardCatalogError`] if no such catalog is embedded or it is
    /// invalid.
    pub fn embedded_named(name: &str) -> Result<Self, WardCatalogError> {
        let toml_str = catalog::catalog_toml(name).ok_or_else(|| WardCatalogError::UnknownCatalog {
            name: name.to_string(),
        })?;
        Self::from_toml_str(toml_str)
    }

    /// Parses and validates a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`WardCatalogError`] if the TOML is invalid or the catalog
    /// fails validation.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, WardCatalogError> {
        let catalog: WardCatalog = toml::de::from_str(toml_str)?;
        Self::from_catalog(catalog)
    }

    /// Validates an already-parsed catalog.
    ///
    /// # Errors
    ///
    /// Returns [`WardCatalogError`] if the catalog is empty, its indices are
    /// not `1..=N` in order, or a centroid is out of range.
    pub fn from_catalog(catalog: WardCatalog) -> Result<Self, WardCatalogError> {
        let WardCatalog { name, wards } = catalog;

        if wards.is_empty() {
            return Err(WardCatalogError::Empty { name });
        }

        for (position, ward) in wards.iter().enumerate() {
            let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
            if ward.index != expected {
                return Err(WardCatalogError::NonContiguous {
                    name,
                    expected,
                    found: ward.index,
                });
            }
            if !ward.centroid().is_valid() {
                return Err(WardCatalogError::InvalidCentroid {
                    name,
                    index: ward.index,
                });
            }
        }

        log::info!("Loaded ward catalog '{name}' with {} wards", wards.len());

        Ok(Self {
            name,
            wards,
            half_span_deg: DEFAULT_WARD_HALF_SPAN_DEG,
        })
    }

    /// Overrides the half-width of the per-ward reference box.
    #[must_use]
    pub const fn with_half_span(mut self, half_span_deg: f64) -> Self {
        self.half_span_deg = half_span_deg;
        self
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of wards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wards.len()
    }

    /// Always `false` for a validated registry; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wards.is_empty()
    }

    /// Iterates over wards in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ward> {
        self.wards.iter()
    }

    /// Resolves a ward by number, name, or both.
    ///
    /// The number takes precedence when both are given. Names match
    /// case-insensitively after trimming; when several wards share a name,
    /// the lowest number wins.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::NotFound`] if neither argument is given, the
    /// number is outside `1..=len()`, or no ward has the given name.
    pub fn resolve(&self, number: Option<u32>, name: Option<&str>) -> Result<WardRef, WardError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        match (number, name) {
            (Some(number), _) => self.resolve_number(number),
            (None, Some(name)) => self.resolve_name(name),
            (None, None) => Err(WardError::NotFound {
                query: "no ward number or name given".to_string(),
            }),
        }
    }

    /// Resolves a ward by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::NotFound`] if the number is outside `1..=len()`.
    pub fn resolve_number(&self, number: u32) -> Result<WardRef, WardError> {
        self.ward(number)
            .map(|ward| self.to_ref(ward))
            .ok_or_else(|| WardError::NotFound {
                query: format!("ward number {number}"),
            })
    }

    /// Resolves a ward by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::NotFound`] if no ward has the given name.
    pub fn resolve_name(&self, name: &str) -> Result<WardRef, WardError> {
        let needle = name.trim().to_lowercase();
        self.wards
            .iter()
            .find(|ward| ward.name.trim().to_lowercase() == needle)
            .map(|ward| self.to_ref(ward))
            .ok_or_else(|| WardError::NotFound {
                query: format!("ward name '{}'", name.trim()),
            })
    }

    /// Centroid of a ward.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::NotFound`] if the number is outside `1..=len()`.
    pub fn centroid_for(&self, number: u32) -> Result<Coordinates, WardError> {
        self.ward(number)
            .map(Ward::centroid)
            .ok_or_else(|| WardError::NotFound {
                query: format!("ward number {number}"),
            })
    }

    /// Bounding box of every ward centroid.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let first = &self.wards[0];
        self.wards.iter().skip(1).fold(
            BoundingBox::new(first.longitude, first.latitude, first.longitude, first.latitude),
            |bbox, ward| {
                BoundingBox::new(
                    bbox.west.min(ward.longitude),
                    bbox.south.min(ward.latitude),
                    bbox.east.max(ward.longitude),
                    bbox.north.max(ward.latitude),
                )
            },
        )
    }

    fn ward(&self, number: u32) -> Option<&Ward> {
        let position = usize::try_from(number).ok()?.checked_sub(1)?;
        self.wards.get(position)
    }

    fn to_ref(&self, ward: &Ward) -> WardRef {
        WardRef {
            id: ward_id(ward.index),
            number: ward.index,
            name: ward.name.clone(),
            centroid: ward.centroid(),
            bounds: BoundingBox::around(ward.latitude, ward.longitude, self.half_span_deg),
        }
    }
}

impl<'a> IntoIterator for &'a WardRegistry {
    type Item = &'a Ward;
    type IntoIter = std::slice::Iter<'a, Ward>;

    fn into_iter(self) -> Self::IntoIter {
        self.wards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_WARDS: &str = r#"
        name = "test"

        [[wards]]
        index = 1
        name = "Sirpur"
        latitude = 22.70
        longitude = 75.81

        [[wards]]
        index = 2
        name = "Vrindavan"
        latitude = 22.72
        longitude = 75.86

        [[wards]]
        index = 3
        name = "Banganga"
        latitude = 22.75
        longitude = 75.84
    "#;

    fn registry() -> WardRegistry {
        WardRegistry::from_toml_str(THREE_WARDS).unwrap()
    }

    #[test]
    fn resolves_by_number() {
        let ward = registry().resolve(Some(2), None).unwrap();
        assert_eq!(ward.number, 2);
        assert_eq!(ward.name, "Vrindavan");
        assert_eq!(ward.id, "ward-2");
        assert!(ward.bounds.contains(22.72, 75.86));
    }

    #[test]
    fn rejects_numbers_outside_range() {
        let registry = registry();
        let size = u32::try_from(registry.len()).unwrap();
        assert!(matches!(
            registry.resolve(Some(0), None),
            Err(WardError::NotFound { .. })
        ));
        assert!(matches!(
            registry.resolve(Some(size + 1), None),
            Err(WardError::NotFound { .. })
        ));
        assert!(registry.resolve(Some(size), None).is_ok());
    }

    #[test]
    fn resolves_name_case_insensitively() {
        let ward = registry().resolve(None, Some("SIRPUR")).unwrap();
        assert_eq!(ward.number, 1);
        assert_eq!(ward.name, "Sirpur");

        let ward = registry().resolve(None, Some("  banganga ")).unwrap();
        assert_eq!(ward.number, 3);
    }

    #[test]
    fn missing_query_is_not_found() {
        assert!(matches!(
            registry().resolve(None, None),
            Err(WardError::NotFound { .. })
        ));
        assert!(matches!(
            registry().resolve(None, Some("   ")),
            Err(WardError::NotFound { .. })
        ));
        assert!(matches!(
            registry().resolve(None, Some("Atlantis")),
            Err(WardError::NotFound { .. })
        ));
    }

    #[test]
    fn number_takes_precedence_over_name() {
        let ward = registry().resolve(Some(3), Some("Sirpur")).unwrap();
        assert_eq!(ward.number, 3);
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_number() {
        let registry = WardRegistry::embedded().unwrap();
        let ward = registry.resolve(None, Some("sukhliya")).unwrap();
        assert_eq!(ward.number, 33);
    }

    #[test]
    fn centroid_lookup() {
        let centroid = registry().centroid_for(3).unwrap();
        assert!((centroid.latitude - 22.75).abs() < f64::EPSILON);
        assert!((centroid.longitude - 75.84).abs() < f64::EPSILON);
        assert!(registry().centroid_for(4).is_err());
    }

    #[test]
    fn bounds_cover_all_centroids() {
        let registry = registry();
        let bounds = registry.bounds();
        for ward in &registry {
            assert!(
                bounds.contains(ward.latitude, ward.longitude),
                "{} outside registry bounds",
                ward.name
            );
        }
        assert!((bounds.south - 22.70).abs() < f64::EPSILON);
        assert!((bounds.north - 22.75).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            WardRegistry::from_toml_str(r#"name = "empty""#),
            Err(WardCatalogError::Empty { .. })
        ));
    }

    #[test]
    fn rejects_gaps_in_indices() {
        let toml_str = r#"
            name = "gappy"
            [[wards]]
            index = 1
            name = "A"
            latitude = 22.7
            longitude = 75.8
            [[wards]]
            index = 3
            name = "C"
            latitude = 22.7
            longitude = 75.8
        "#;
        assert!(matches!(
            WardRegistry::from_toml_str(toml_str),
            Err(WardCatalogError::NonContiguous {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn rejects_invalid_centroid() {
        let toml_str = r#"
            name = "bad"
            [[wards]]
            index = 1
            name = "A"
            latitude = 122.7
            longitude = 75.8
        "#;
        assert!(matches!(
            WardRegistry::from_toml_str(toml_str),
            Err(WardCatalogError::InvalidCentroid { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            WardRegistry::from_toml_str("wards = ["),
            Err(WardCatalogError::Parse(_))
        ));
    }

    #[test]
    fn unknown_embedded_catalog_is_an_error() {
        assert!(matches!(
            WardRegistry::embedded_named("atlantis"),
            Err(WardCatalogError::UnknownCatalog { .. })
        ));
    }
}
