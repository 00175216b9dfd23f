#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular sheet types.
//!
//! A [`TabularDataset`] is the immutable content of one sheet. What the
//! user is looking at (search term, expanded rows, visible rows) lives
//! separately in a [`DatasetView`], so reloading a sheet never has to
//! patch view state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Dataset name used in export filenames when none is configured.
pub const DEFAULT_DATASET_NAME: &str = "Indore_Data";

/// A named grid of raw cells; the first row is the header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Rows of raw cells, header row first.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    /// Sheets in workbook order.
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Sheet names in workbook order.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Looks up a sheet by exact name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// One data row. `cells` is aligned with the dataset headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularRow {
    /// Synthetic id: the 0-based position of the row in its sheet.
    pub id: usize,
    /// Cell values, one per header.
    pub cells: Vec<String>,
}

/// The loaded content of one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularDataset {
    /// Dataset name, used in export filenames.
    pub name: String,
    /// Sheet the rows came from.
    pub sheet: String,
    /// Column names in order.
    pub headers: Vec<String>,
    /// Rows in sheet order.
    pub rows: Vec<TabularRow>,
}

impl TabularDataset {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row by synthetic id.
    #[must_use]
    pub fn row(&self, id: usize) -> Option<&TabularRow> {
        self.rows.get(id)
    }

    /// Cell of `row` under `column`.
    #[must_use]
    pub fn value<'a>(&self, row: &'a TabularRow, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|header| header == column)?;
        row.cells.get(index).map(String::as_str)
    }

    /// Every synthetic id, in order.
    #[must_use]
    pub fn row_ids(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.id).collect()
    }
}

/// View state over a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetView {
    /// Sheet the view belongs to.
    pub selected_sheet: Option<String>,
    /// Current search term; empty means unfiltered.
    pub search_term: String,
    /// Rows whose details are expanded.
    pub expanded: BTreeSet<usize>,
    /// Ids of the rows matching the search term, in dataset order.
    pub visible: Vec<usize>,
}

impl DatasetView {
    /// Whether `row_id` is expanded.
    #[must_use]
    pub fn is_expanded(&self, row_id: usize) -> bool {
        self.expanded.contains(&row_id)
    }

    /// A copy with `row_id` expanded if it was collapsed and collapsed if
    /// it was expanded.
    #[must_use]
    pub fn toggled(&self, row_id: usize) -> Self {
        let mut view = self.clone();
        if !view.expanded.remove(&row_id) {
            view.expanded.insert(row_id);
        }
        view
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// A produced export blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    /// Suggested filename, `<dataset>_<sheet>.csv`.
    pub filename: String,
    /// Delimited text, header first.
    pub content: String,
    /// Number of data rows in `content`.
    pub row_count: usize,
}
