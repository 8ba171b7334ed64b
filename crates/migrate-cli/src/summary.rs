//! Human-readable stdout tables for profiles, suggestions, and history.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use migrate_model::{CorpusEntry, ReviewPayload, SourceDna};

/// Placeholder for sample values unless `--show-samples` is set.
const REDACTED_VALUE: &str = "[REDACTED]";

pub fn print_profile(dna: &SourceDna, show_samples: bool) {
    println!("Source: {} ({})", dna.source_system, dna.source_type);
    println!(
        "Columns: {}  Rows: {}  DNA: {}",
        dna.column_count, dna.row_count, dna.dna_id
    );
    println!("Structure hash: {}", dna.structure_hash);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Pattern"),
        header_cell("Confidence"),
        header_cell("Null %"),
        header_cell("Unique %"),
        header_cell("Samples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    for column in &dna.columns {
        let samples = if show_samples {
            column.sample_values.join(", ")
        } else if column.sample_values.is_empty() {
            String::new()
        } else {
            REDACTED_VALUE.to_string()
        };
        table.add_row(vec![
            Cell::new(&column.original_name),
            Cell::new(column.data_type_inferred.as_str()),
            Cell::new(column.primary_pattern.as_str()),
            confidence_cell(column.pattern_confidence),
            Cell::new(format_percent(column.null_percentage)),
            Cell::new(format_percent(column.unique_percentage)),
            dim_cell(samples),
        ]);
    }
    println!("{table}");
}

pub fn print_suggestions(payload: &ReviewPayload) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source column"),
        header_cell("Target"),
        header_cell("Confidence"),
        header_cell("Reasons"),
        header_cell("Alternatives"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    for suggestion in &payload.suggestions {
        let target_cell = if suggestion.is_unmapped() {
            Cell::new(suggestion.target().to_string()).fg(Color::Red)
        } else {
            Cell::new(suggestion.target().to_string())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        let alternatives = suggestion
            .alternative_mappings
            .iter()
            .map(|alt| {
                format!(
                    "{}.{} ({:.0}%)",
                    alt.target_table,
                    alt.target_column,
                    alt.confidence * 100.0
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&suggestion.source_column),
            target_cell,
            confidence_cell(suggestion.confidence),
            Cell::new(suggestion.reasons.join("\n")),
            dim_cell(alternatives),
        ]);
    }
    println!("{table}");

    let resolved = payload
        .suggestions
        .iter()
        .filter(|s| !s.is_unmapped())
        .count();
    println!(
        "Resolved {resolved}/{} columns, estimated accuracy {:.0}%",
        payload.suggestions.len(),
        payload.estimated_accuracy * 100.0
    );
    if !payload.similar_past_migrations.is_empty() {
        println!("Similar past migrations:");
        for similar in &payload.similar_past_migrations {
            println!(
                "- {} from {} ({:.0}% similar)",
                similar.dna_id,
                similar.source_system,
                similar.similarity * 100.0
            );
        }
    }
}

pub fn print_history(entries: &[CorpusEntry]) {
    if entries.is_empty() {
        println!("Corpus is empty.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("DNA"),
        header_cell("Source system"),
        header_cell("Recorded"),
        header_cell("Outcomes"),
        header_cell("Learnable"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    for entry in entries {
        let record = &entry.record;
        table.add_row(vec![
            Cell::new(record.dna_id.as_str()),
            Cell::new(&record.source_system),
            Cell::new(record.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(record.confirmed_mappings.len()),
            Cell::new(record.learnable().count()),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn confidence_cell(confidence: f32) -> Cell {
    let label = format!("{:.0}%", confidence * 100.0);
    if confidence >= 0.8 {
        Cell::new(label).fg(Color::Green)
    } else if confidence >= 0.5 {
        Cell::new(label).fg(Color::Yellow)
    } else if confidence > 0.0 {
        Cell::new(label).fg(Color::Red)
    } else {
        dim_cell(label)
    }
}

fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
