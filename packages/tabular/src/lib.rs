#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sheet loading, search and view transitions.
//!
//! Datasets are loaded wholesale per sheet and never edited afterwards.
//! Search is a case-insensitive substring match over every cell plus the
//! synthetic row id. View transitions take a [`DatasetView`] and return a
//! new one.

pub mod export;

use std::io::Read;

use serde_json::Value;
use survey_map_tabular_models::{DatasetView, TabularDataset, TabularRow, Workbook};
use thiserror::Error;

pub use export::{export_filename, export_filtered, to_delimited_text};

/// Errors from loading or exporting tabular data.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Nothing to load or export.
    #[error("Empty input: {message}")]
    EmptyInput {
        /// What was empty.
        message: String,
    },

    /// The workbook has no sheet with this name.
    #[error("Unknown sheet '{name}'")]
    UnknownSheet {
        /// Requested sheet name.
        name: String,
    },

    /// Reading or writing delimited text failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the export buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The export buffer was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Builds a dataset from a header row and data rows.
///
/// Each row is aligned to the headers: short rows are padded with empty
/// cells and cells beyond the last header are dropped. Row ids are the
/// 0-based input positions.
///
/// # Errors
///
/// Returns [`TabularError::EmptyInput`] if there are no headers.
pub fn load(
    name: &str,
    sheet: &str,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> Result<TabularDataset, TabularError> {
    if headers.is_empty() {
        return Err(TabularError::EmptyInput {
            message: format!("sheet '{sheet}' has no header row"),
        });
    }

    let width = headers.len();
    let rows: Vec<TabularRow> = rows
        .into_iter()
        .enumerate()
        .map(|(id, mut cells)| {
            cells.resize(width, String::new());
            TabularRow { id, cells }
        })
        .collect();

    log::info!("Loaded {} rows from sheet '{sheet}'", rows.len());

    Ok(TabularDataset {
        name: name.to_string(),
        sheet: sheet.to_string(),
        headers,
        rows,
    })
}

/// Loads one sheet of a workbook. The first row is the header row.
///
/// # Errors
///
/// Returns [`TabularError::UnknownSheet`] if the sheet does not exist and
/// [`TabularError::EmptyInput`] if it has no rows.
pub fn load_sheet(workbook: &Workbook, name: &str, sheet: &str) -> Result<TabularDataset, TabularError> {
    let found = workbook
        .sheet(sheet)
        .ok_or_else(|| TabularError::UnknownSheet {
            name: sheet.to_string(),
        })?;

    let mut rows = found.rows.iter();
    let Some(header_row) = rows.next() else {
        return Err(TabularError::EmptyInput {
            message: format!("no data found in sheet '{sheet}'"),
        });
    };

    let headers = header_row.iter().map(coerce_cell).collect();
    let data = rows
        .map(|row| row.iter().map(coerce_cell).collect())
        .collect();

    load(name, sheet, headers, data)
}

/// Loads delimited text with a header row.
///
/// Rows may have any number of fields; they are aligned like [`load`].
///
/// # Errors
///
/// Returns [`TabularError::Csv`] if the input cannot be read and
/// [`TabularError::EmptyInput`] if it has no header row.
pub fn load_csv<R: Read>(name: &str, sheet: &str, reader: R) -> Result<TabularDataset, TabularError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

    load(name, sheet, headers, rows)
}

/// String form of a raw cell.
///
/// `null` becomes empty, strings are kept as-is, numbers and booleans use
/// their JSON form and nested values are written as compact JSON.
#[must_use]
pub fn coerce_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Rows where any cell, or the row id, contains `term` case-insensitively.
///
/// An empty term returns every row in order.
#[must_use]
pub fn search<'a>(dataset: &'a TabularDataset, term: &str) -> Vec<&'a TabularRow> {
    if term.is_empty() {
        return dataset.rows.iter().collect();
    }

    let needle = term.to_lowercase();
    dataset
        .rows
        .iter()
        .filter(|row| row_matches(row, &needle))
        .collect()
}

fn row_matches(row: &TabularRow, needle: &str) -> bool {
    row.id.to_string().contains(needle)
        || row
            .cells
            .iter()
            .any(|cell| cell.to_lowercase().contains(needle))
}

/// Fresh view over a just-loaded dataset: no search, nothing expanded,
/// every row visible.
#[must_use]
pub fn open_view(dataset: &TabularDataset) -> DatasetView {
    DatasetView {
        selected_sheet: Some(dataset.sheet.clone()),
        search_term: String::new(),
        expanded: std::collections::BTreeSet::new(),
        visible: dataset.row_ids(),
    }
}

/// Loads a sheet and opens a fresh view over it.
///
/// Any previous view is discarded, so expanded rows never carry over from
/// another sheet.
///
/// # Errors
///
/// See [`load_sheet`].
pub fn select_sheet(
    workbook: &Workbook,
    name: &str,
    sheet: &str,
) -> Result<(TabularDataset, DatasetView), TabularError> {
    let dataset = load_sheet(workbook, name, sheet)?;
    let view = open_view(&dataset);
    Ok((dataset, view))
}

/// Applies a search term. Expanded rows are kept.
#[must_use]
pub fn apply_search(view: &DatasetView, dataset: &TabularDataset, term: &str) -> DatasetView {
    DatasetView {
        search_term: term.to_string(),
        visible: search(dataset, term).iter().map(|row| row.id).collect(),
        ..view.clone()
    }
}

/// Toggles the expansion of one row. Unknown row ids leave the view as is.
#[must_use]
pub fn toggle_expansion(view: &DatasetView, dataset: &TabularDataset, row_id: usize) -> DatasetView {
    if dataset.row(row_id).is_none() {
        log::debug!("Ignoring expansion toggle for unknown row {row_id}");
        return view.clone();
    }
    view.toggled(row_id)
}

/// Rows currently visible in `view`, in dataset order.
#[must_use]
pub fn visible_rows<'a>(view: &DatasetView, dataset: &'a TabularDataset) -> Vec<&'a TabularRow> {
    view.visible
        .iter()
        .filter_map(|&id| dataset.row(id))
        .collect()
}
