//! CSV to `RawSource` adapter.
//!
//! Source exports are treated as header + data: the first non-empty row is
//! the header. Cells are trimmed and BOM-stripped, fully blank rows are
//! dropped, and short rows are padded so every row aligns with the header.

use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;

use migrate_model::RawSource;

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_source(path: &Path, source_system: &str) -> Result<RawSource> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let cells: Vec<String> = record.iter().map(normalize_cell).collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if columns.is_empty() {
            columns = cells.iter().map(|cell| normalize_header(cell)).collect();
            continue;
        }
        let mut row = cells;
        row.resize(columns.len(), String::new());
        rows.push(row);
    }
    if columns.is_empty() {
        bail!("{}: no header row found", path.display());
    }

    Ok(RawSource::new(source_system, "CSV", columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn reads_header_and_rows() {
        let file = write_csv("first_name,email\nJohn,j@x.org\nJane,d@x.org\n");
        let source = read_csv_source(file.path(), "EPIC").expect("read");
        assert_eq!(source.columns, vec!["first_name", "email"]);
        assert_eq!(source.row_count(), 2);
        assert_eq!(source.source_system, "EPIC");
        assert_eq!(source.source_type, "CSV");
    }

    #[test]
    fn strips_bom_and_skips_blank_rows() {
        let file = write_csv("\u{feff}name,dept\n,\nBob,ICU\n");
        let source = read_csv_source(file.path(), "legacy").expect("read");
        assert_eq!(source.columns, vec!["name", "dept"]);
        assert_eq!(source.row_count(), 1);
    }

    #[test]
    fn pads_short_rows_to_header_width() {
        let file = write_csv("a,b,c\n1,2\n");
        let source = read_csv_source(file.path(), "legacy").expect("read");
        assert_eq!(source.rows[0], vec!["1", "2", ""]);
        assert_eq!(source.column_values(2), vec![None]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = write_csv("");
        assert!(read_csv_source(file.path(), "legacy").is_err());
    }
}
