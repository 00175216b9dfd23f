#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Survey dashboard facade.
//!
//! [`Dashboard`] owns the ward registry, the current snapshot of survey
//! records and the currently loaded sheet. Statistics, markers and heat
//! layers are recomputed from the snapshot on every call; nothing derived
//! is cached, so replacing the records is all it takes to refresh a view.

pub mod config;

use chrono::NaiveDateTime;
use survey_map_analytics_models::{AggregateStats, RecentActivity, WardSummary};
use survey_map_spatial::MapRenderer;
use survey_map_spatial_models::{
    BoundingBox, ClusterConfig, HeatPoint, MapView, MarkerCluster, MarkerSet,
};
use survey_map_survey::{MalformedRecord, SurveyIngestError};
use survey_map_survey_models::SurveyRecord;
use survey_map_tabular::TabularError;
use survey_map_tabular_models::{CsvExport, DatasetView, TabularDataset, Workbook};
use survey_map_ward::{WardCatalogError, WardError, WardRegistry};
use survey_map_ward_models::WardRef;
use thiserror::Error;

pub use config::DashboardConfig;

/// Errors surfaced by the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A ward lookup failed.
    #[error(transparent)]
    Ward(#[from] WardError),

    /// The ward catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] WardCatalogError),

    /// A survey payload could not be read.
    #[error(transparent)]
    Ingest(#[from] SurveyIngestError),

    /// Loading, searching or exporting a sheet failed.
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// The configuration document is malformed.
    #[error("Invalid dashboard configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration names an export delimiter that cannot round-trip.
    #[error("Invalid export delimiter {delimiter:?}")]
    InvalidDelimiter {
        /// Configured delimiter.
        delimiter: char,
    },
}

/// The dashboard facade.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    registry: WardRegistry,
    records: Vec<SurveyRecord>,
    malformed: Vec<MalformedRecord>,
    workbook: Option<Workbook>,
    dataset: Option<TabularDataset>,
    view: DatasetView,
}

impl Dashboard {
    /// Builds a dashboard over the embedded catalog named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Catalog`] if the catalog cannot be loaded.
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let registry = WardRegistry::embedded_named(&config.catalog)?;
        Ok(Self::with_registry(registry, config))
    }

    /// Builds a dashboard over an already-loaded registry.
    #[must_use]
    pub fn with_registry(registry: WardRegistry, config: DashboardConfig) -> Self {
        Self {
            config,
            registry,
            records: Vec::new(),
            malformed: Vec::new(),
            workbook: None,
            dataset: None,
            view: DatasetView::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Ward registry.
    #[must_use]
    pub const fn registry(&self) -> &WardRegistry {
        &self.registry
    }

    // Survey snapshot

    /// Replaces the survey snapshot.
    pub fn set_records(&mut self, records: Vec<SurveyRecord>) {
        self.records = records;
        self.malformed.clear();
    }

    /// Replaces the survey snapshot from a JSON payload.
    ///
    /// Malformed records are kept for [`Self::malformed`]. They count
    /// toward [`Self::get_aggregate_stats`] but stay off the map and out
    /// of ward rollups. Returns the number of records accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Ingest`] if the payload is not a survey
    /// list at all. The previous snapshot is kept in that case.
    pub fn ingest_json(&mut self, json: &str) -> Result<usize, DashboardError> {
        let report = survey_map_survey::parse_records(json).inspect_err(|e| {
            log::warn!("Rejected survey payload, keeping {} records: {e}", self.records.len());
        })?;
        self.records = report.records;
        self.malformed = report.malformed;
        Ok(self.records.len())
    }

    /// Current survey snapshot.
    #[must_use]
    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    /// Records skipped during the last ingestion.
    #[must_use]
    pub fn malformed(&self) -> &[MalformedRecord] {
        &self.malformed
    }

    // Wards

    /// Resolves a ward by number or name.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Ward`] if no ward matches.
    pub fn resolve_ward(&self, number: Option<u32>, name: Option<&str>) -> Result<WardRef, DashboardError> {
        Ok(self.registry.resolve(number, name)?)
    }

    // Statistics

    /// Headline statistics over the snapshot, malformed records included.
    #[must_use]
    pub fn get_aggregate_stats(&self) -> AggregateStats {
        let malformed: Vec<_> = self.malformed.iter().map(|record| &record.tally).collect();
        survey_map_analytics::aggregate_with_malformed(&self.records, &malformed)
    }

    /// Per-ward rollups, worst compliance first.
    #[must_use]
    pub fn ward_summaries(&self) -> Vec<WardSummary> {
        survey_map_analytics::ward_summaries(&self.records)
    }

    /// Activity over the default trailing window ending at `now`.
    #[must_use]
    pub fn recent_activity(&self, now: NaiveDateTime) -> RecentActivity {
        survey_map_analytics::recent_activity_default(&self.records, now)
    }

    // Map

    /// Markers for the snapshot, optionally restricted to one ward.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Ward`] if the ward filter names a ward
    /// that is not in the registry.
    pub fn get_marker_set(&self, ward_filter: Option<u32>) -> Result<MarkerSet, DashboardError> {
        if let Some(ward) = ward_filter {
            self.registry.resolve_number(ward)?;
        }
        Ok(survey_map_spatial::build_markers(&self.records, ward_filter))
    }

    /// Heat layer for the markers of `ward_filter`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_marker_set`].
    pub fn heat_layer(&self, ward_filter: Option<u32>) -> Result<Vec<HeatPoint>, DashboardError> {
        Ok(survey_map_spatial::heat_layer(&self.get_marker_set(ward_filter)?))
    }

    /// Cluster policy at `zoom` for the markers of `ward_filter`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_marker_set`].
    pub fn cluster_hint(&self, ward_filter: Option<u32>, zoom: u8) -> Result<ClusterConfig, DashboardError> {
        let markers = self.get_marker_set(ward_filter)?;
        Ok(survey_map_spatial::cluster_hint(&markers, zoom, &self.config.cluster))
    }

    /// Markers of `ward_filter` grouped at `zoom`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_marker_set`].
    pub fn clusters(&self, ward_filter: Option<u32>, zoom: u8) -> Result<Vec<MarkerCluster>, DashboardError> {
        let markers = self.get_marker_set(ward_filter)?;
        let config = survey_map_spatial::cluster_hint(&markers, zoom, &self.config.cluster);
        Ok(survey_map_spatial::cluster_markers(&markers, &config))
    }

    /// Bounds of the markers of `ward_filter`; `None` when there are none.
    ///
    /// # Errors
    ///
    /// See [`Self::get_marker_set`].
    pub fn fit_bounds(&self, ward_filter: Option<u32>) -> Result<Option<BoundingBox>, DashboardError> {
        Ok(survey_map_spatial::fit_bounds(&self.get_marker_set(ward_filter)?))
    }

    /// Redraws `renderer` with the markers and heat layer of `ward_filter`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_marker_set`]. The renderer is untouched on error.
    pub fn render_map<R: MapRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        ward_filter: Option<u32>,
    ) -> Result<MarkerSet, DashboardError> {
        let markers = self.get_marker_set(ward_filter)?;
        let heat = survey_map_spatial::heat_layer(&markers);
        survey_map_spatial::render(renderer, &markers, &heat);
        Ok(markers)
    }

    /// Clears `renderer` and returns the overview it should show.
    pub fn reset_view<R: MapRenderer + ?Sized>(&self, renderer: &mut R) -> MapView {
        survey_map_spatial::reset_view(renderer)
    }

    // Sheets

    /// Replaces the workbook. Any loaded sheet and its view are dropped.
    pub fn set_workbook(&mut self, workbook: Workbook) -> Vec<String> {
        let names = workbook
            .sheet_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.workbook = Some(workbook);
        self.dataset = None;
        self.view = DatasetView::default();
        names
    }

    /// Loads a sheet of the current workbook and resets the view.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Tabular`] if there is no workbook, the
    /// sheet does not exist, or it is empty. The previous sheet stays
    /// loaded in that case.
    pub fn load_sheet(&mut self, sheet: &str) -> Result<&TabularDataset, DashboardError> {
        let workbook = self.workbook.as_ref().ok_or_else(|| TabularError::EmptyInput {
            message: "no workbook loaded".to_string(),
        })?;
        let (dataset, view) = survey_map_tabular::select_sheet(workbook, &self.config.dataset_name, sheet)?;
        Ok(self.install(dataset, view))
    }

    /// Installs a dataset loaded elsewhere (for example from delimited
    /// text) and resets the view.
    pub fn load_dataset(&mut self, dataset: TabularDataset) -> &TabularDataset {
        let view = survey_map_tabular::open_view(&dataset);
        self.install(dataset, view)
    }

    fn install(&mut self, dataset: TabularDataset, view: DatasetView) -> &TabularDataset {
        self.view = view;
        self.dataset.insert(dataset)
    }

    /// Currently loaded sheet.
    #[must_use]
    pub const fn dataset(&self) -> Option<&TabularDataset> {
        self.dataset.as_ref()
    }

    /// Current view state.
    #[must_use]
    pub const fn view(&self) -> &DatasetView {
        &self.view
    }

    /// Applies a search term to the loaded sheet.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Tabular`] if no sheet is loaded.
    pub fn search(&mut self, term: &str) -> Result<&DatasetView, DashboardError> {
        let dataset = self.dataset.as_ref().ok_or_else(no_sheet_loaded)?;
        self.view = survey_map_tabular::apply_search(&self.view, dataset, term);
        Ok(&self.view)
    }

    /// Toggles the expansion of one row of the loaded sheet.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Tabular`] if no sheet is loaded.
    pub fn toggle_expansion(&mut self, row_id: usize) -> Result<&DatasetView, DashboardError> {
        let dataset = self.dataset.as_ref().ok_or_else(no_sheet_loaded)?;
        self.view = survey_map_tabular::toggle_expansion(&self.view, dataset, row_id);
        Ok(&self.view)
    }

    /// Exports the rows of the loaded sheet matching `term`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Tabular`] if no sheet is loaded or no row
    /// matches.
    pub fn export_filtered(&self, term: &str) -> Result<CsvExport, DashboardError> {
        let dataset = self.dataset.as_ref().ok_or_else(no_sheet_loaded)?;
        Ok(survey_map_tabular::export_filtered(
            dataset,
            term,
            &self.config.export.options(),
        )?)
    }
}

fn no_sheet_loaded() -> TabularError {
    TabularError::EmptyInput {
        message: "no sheet loaded".to_string(),
    }
}
