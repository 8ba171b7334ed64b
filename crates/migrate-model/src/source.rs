//! Raw source data as handed over by the ingestion collaborator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One import source: provenance tags plus columnar string data.
///
/// The engine consumes this once, immutably, for the duration of a
/// profiling pass. Empty cells are the null representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSource {
    /// Originating system, free text (e.g. "EPIC", "legacy_ehr").
    pub source_system: String,
    /// Transport/format tag, free text (e.g. "CSV").
    pub source_type: String,
    /// Column names in source order.
    pub columns: Vec<String>,
    /// Row-major cell data, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

impl RawSource {
    pub fn new(
        source_system: impl Into<String>,
        source_type: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            source_system: source_system.into(),
            source_type: source_type.into(),
            columns,
            rows,
        }
    }

    /// Builds a source from record maps, preserving the given column order.
    /// Columns absent from a record are treated as null.
    pub fn from_records(
        source_system: impl Into<String>,
        source_type: impl Into<String>,
        columns: Vec<String>,
        records: &[BTreeMap<String, String>],
    ) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self::new(source_system, source_type, columns, rows)
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All values of one column in row order; empty/whitespace cells are `None`.
    #[must_use]
    pub fn column_values(&self, index: usize) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| {
                row.get(index)
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty())
            })
            .collect()
    }
}

/// Normalizes a column name for comparison: lowercases and collapses
/// delimiters and camelCase boundaries into single spaces.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if prev_lower && ch.is_uppercase() {
                spaced.push(' ');
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            spaced.push(ch);
        } else {
            spaced.push(' ');
            prev_lower = false;
        }
    }
    spaced
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_delimiters_and_case() {
        assert_eq!(normalize_name("First_Name"), "first name");
        assert_eq!(normalize_name("  emp-email "), "emp email");
        assert_eq!(normalize_name("providerNpi"), "provider npi");
        assert_eq!(normalize_name("DOB"), "dob");
    }

    #[test]
    fn column_values_treat_blank_cells_as_null() {
        let source = RawSource::new(
            "EPIC",
            "CSV",
            vec!["a".into()],
            vec![vec!["x".into()], vec!["  ".into()], vec![String::new()]],
        );
        assert_eq!(source.column_values(0), vec![Some("x"), None, None]);
    }
}
