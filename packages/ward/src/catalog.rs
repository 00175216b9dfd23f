//! Compile-time registry of ward catalogs.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a city requires a TOML file in `catalogs/` and an entry here.

/// Number of wards in the embedded Indore catalog. Enforced by a test.
#[cfg(test)]
const EXPECTED_INDORE_WARDS: usize = 158;

/// Name of the catalog used when none is specified.
pub const DEFAULT_CATALOG: &str = "indore";

/// Embedded TOML catalogs.
const CATALOG_TOMLS: &[(&str, &str)] = &[("indore", include_str!("../catalogs/indore.toml"))];

/// Returns the raw TOML of an embedded catalog.
#[must_use]
pub fn catalog_toml(name: &str) -> Option<&'static str> {
    CATALOG_TOMLS
        .iter()
        .find(|(catalog, _)| catalog.eq_ignore_ascii_case(name))
        .map(|(_, toml_str)| *toml_str)
}

/// Names of all embedded catalogs.
#[must_use]
pub fn catalog_names() -> Vec<&'static str> {
    CATALOG_TOMLS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WardRegistry;

    #[test]
    fn loads_all_catalogs() {
        for name in catalog_names() {
            let toml_str = catalog_toml(name).unwrap();
            if let Err(e) = WardRegistry::from_toml_str(toml_str) {
                panic!("Embedded catalog '{name}' failed to load: {e}");
            }
        }
    }

    #[test]
    fn indore_catalog_has_expected_size() {
        let registry = WardRegistry::from_toml_str(catalog_toml(DEFAULT_CATALOG).unwrap()).unwrap();
        assert_eq!(
            registry.len(),
            EXPECTED_INDORE_WARDS,
            "Expected {EXPECTED_INDORE_WARDS} wards, found {}. \
             Update EXPECTED_INDORE_WARDS after editing the catalog.",
            registry.len()
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(catalog_toml("INDORE").is_some());
        assert!(catalog_toml("bhopal").is_none());
    }
}
