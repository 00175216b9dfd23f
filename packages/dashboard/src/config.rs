//! Dashboard configuration.
//!
//! Read from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! dataset_name = "Indore_Data"
//! catalog = "indore"
//!
//! [cluster]
//! radius_px = 80.0
//! disable_clustering_at_zoom = 17
//!
//! [export]
//! delimiter = ","
//! ```

use serde::Deserialize;
use survey_map_spatial_models::ClusterPolicy;
use survey_map_tabular_models::{DEFAULT_DATASET_NAME, ExportOptions};
use survey_map_ward::catalog::DEFAULT_CATALOG;

use crate::DashboardError;

/// Characters that would collide with quoting or record separators.
const RESERVED_DELIMITERS: [char; 3] = ['"', '\n', '\r'];

/// Settings for a [`crate::Dashboard`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prefix of export filenames.
    pub dataset_name: String,
    /// Embedded ward catalog to load.
    pub catalog: String,
    /// Zoom-dependent clustering constants.
    pub cluster: ClusterPolicy,
    /// Export settings.
    pub export: ExportConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            catalog: DEFAULT_CATALOG.to_string(),
            cluster: ClusterPolicy::default(),
            export: ExportConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the document is malformed and
    /// [`DashboardError::InvalidDelimiter`] if the export delimiter is a
    /// quote or line break.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, DashboardError> {
        let config: Self = toml::de::from_str(toml_str)?;
        if RESERVED_DELIMITERS.contains(&config.export.delimiter) {
            return Err(DashboardError::InvalidDelimiter {
                delimiter: config.export.delimiter,
            });
        }
        Ok(config)
    }
}

/// `[export]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Single-byte field delimiter.
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl ExportConfig {
    /// Export options for the tabular engine. Delimiters outside ASCII, and
    /// quotes or line breaks, fall back to a comma.
    #[must_use]
    pub fn options(&self) -> ExportOptions {
        let options = u8::try_from(self.delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && !RESERVED_DELIMITERS.contains(&char::from(*byte)))
            .map(|delimiter| ExportOptions { delimiter });
        options.unwrap_or_else(|| {
            log::warn!("Unusable export delimiter {:?}, using ','", self.delimiter);
            ExportOptions::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.dataset_name, "Indore_Data");
    }

    #[test]
    fn partial_cluster_table_keeps_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            dataset_name = "Ward_Audit"

            [cluster]
            radius_px = 40.0

            [export]
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.dataset_name, "Ward_Audit");
        assert!((config.cluster.radius_px - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.cluster.disable_clustering_at_zoom, 17);
        assert_eq!(config.export.options().delimiter, b';');
    }

    #[test]
    fn non_ascii_delimiter_falls_back_to_comma() {
        let export = ExportConfig { delimiter: '§' };
        assert_eq!(export.options().delimiter, b',');
    }

    #[test]
    fn quote_and_line_break_delimiters_are_rejected() {
        for delimiter in ['"', '\n', '\r'] {
            assert_eq!(ExportConfig { delimiter }.options().delimiter, b',');
        }
        assert!(matches!(
            DashboardConfig::from_toml_str("[export]\ndelimiter = '\"'\n"),
            Err(DashboardError::InvalidDelimiter { delimiter: '"' })
        ));
        assert_eq!(ExportConfig { delimiter: '\t' }.options().delimiter, b'\t');
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        assert!(matches!(
            DashboardConfig::from_toml_str("dataset_name = "),
            Err(DashboardError::Config(_))
        ));
    }
}
