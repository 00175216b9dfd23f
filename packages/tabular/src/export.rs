//! Delimited-text export.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use survey_map_tabular_models::{CsvExport, ExportOptions, TabularDataset, TabularRow};

use crate::{TabularError, search};

/// Writes the header row and `rows` as delimited text.
///
/// Every field is quoted and embedded quotes are doubled. Records are
/// separated by a single `\n` with no trailing newline. The synthetic row
/// id is not exported.
///
/// # Errors
///
/// Returns [`TabularError`] if writing fails.
pub fn to_delimited_text<'a, I>(
    headers: &[String],
    rows: I,
    options: &ExportOptions,
) -> Result<String, TabularError>
where
    I: IntoIterator<Item = &'a TabularRow>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row.cells)?;
    }

    let buffer = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(buffer)?;
    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}

/// `<dataset>_<sheet>.csv`.
#[must_use]
pub fn export_filename(dataset: &TabularDataset) -> String {
    format!("{}_{}.csv", dataset.name, dataset.sheet)
}

/// Exports the rows matching `term`.
///
/// # Errors
///
/// Returns [`TabularError::EmptyInput`] if no row matches, or another
/// [`TabularError`] if writing fails.
pub fn export_filtered(
    dataset: &TabularDataset,
    term: &str,
    options: &ExportOptions,
) -> Result<CsvExport, TabularError> {
    let rows = search(dataset, term);
    if rows.is_empty() {
        return Err(TabularError::EmptyInput {
            message: format!(
                "no rows of sheet '{}' match '{term}'; nothing to export",
                dataset.sheet
            ),
        });
    }

    let row_count = rows.len();
    let content = to_delimited_text(&dataset.headers, rows, options)?;
    let filename = export_filename(dataset);

    log::info!("Exported {row_count} rows to {filename}");

    Ok(CsvExport {
        filename,
        content,
        row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    fn dataset() -> TabularDataset {
        load(
            "Indore_Data",
            "Buildings",
            strings(&["Building", "Notes"]),
            vec![
                strings(&["Rajwada", "plain"]),
                strings(&["Lal Bagh", "has, comma \"quoted\"\nand a newline"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn quotes_every_field() {
        let dataset = dataset();
        let text = to_delimited_text(&dataset.headers, &dataset.rows[..1], &ExportOptions::default())
            .unwrap();
        assert_eq!(text, "\"Building\",\"Notes\"\n\"Rajwada\",\"plain\"");
    }

    #[test]
    fn round_trips_through_csv_reader() {
        let dataset = dataset();
        let text = to_delimited_text(&dataset.headers, &dataset.rows, &ExportOptions::default())
            .unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, dataset.headers);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], dataset.rows[1].cells, "tricky field must survive intact");
    }

    #[test]
    fn honors_custom_delimiter() {
        let dataset = dataset();
        let options = ExportOptions { delimiter: b';' };
        let text = to_delimited_text(&dataset.headers, &dataset.rows[..1], &options).unwrap();
        assert!(text.starts_with("\"Building\";\"Notes\""));
    }

    #[test]
    fn export_uses_filtered_rows_and_filename() {
        let export = export_filtered(&dataset(), "RAJ", &ExportOptions::default()).unwrap();
        assert_eq!(export.filename, "Indore_Data_Buildings.csv");
        assert_eq!(export.row_count, 1);
        assert!(!export.content.contains("Lal Bagh"));
    }

    #[test]
    fn exporting_nothing_is_empty_input() {
        assert!(matches!(
            export_filtered(&dataset(), "atlantis", &ExportOptions::default()),
            Err(TabularError::EmptyInput { .. })
        ));
    }
}
