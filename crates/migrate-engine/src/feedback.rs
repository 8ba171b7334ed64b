//! Turns reviewed mappings into immutable history the index can learn from.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use migrate_model::{
    ConfirmedMapping, CorpusEntry, HistoricalMigrationRecord, MappingOutcome, MappingSuggestion,
    SourceDna,
};

use migrate_index::{CorpusStore, SimilarityIndex};

use crate::error::EngineError;

/// Joins human review decisions back onto the engine's suggestions and
/// appends the result to the historical corpus.
///
/// Records are append-only; a correction to an old migration is a new
/// record, never an edit.
#[derive(Debug, Default)]
pub struct FeedbackLoop;

impl FeedbackLoop {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the historical record for one confirmed migration and writes
    /// it to the corpus. Every confirmed column must exist in the source.
    pub fn record<S: CorpusStore>(
        &self,
        dna: &SourceDna,
        suggestions: &[MappingSuggestion],
        confirmed: &[ConfirmedMapping],
        index: &SimilarityIndex<S>,
    ) -> Result<HistoricalMigrationRecord, EngineError> {
        let record = self.build_record(dna, suggestions, confirmed)?;

        let entry = CorpusEntry {
            record: record.clone(),
            signature_vector: dna.signature_vector.clone(),
            structure_hash: dna.structure_hash.clone(),
        };
        index.add(entry).map_err(EngineError::Corpus)?;

        info!(
            dna_id = %record.dna_id,
            outcomes = record.confirmed_mappings.len(),
            learnable = record.learnable().count(),
            "migration recorded to corpus"
        );
        Ok(record)
    }

    /// Assembles outcomes without touching the corpus. Outcomes follow the
    /// source's column order regardless of review order.
    pub fn build_record(
        &self,
        dna: &SourceDna,
        suggestions: &[MappingSuggestion],
        confirmed: &[ConfirmedMapping],
    ) -> Result<HistoricalMigrationRecord, EngineError> {
        let suggested_by_column: BTreeMap<&str, &MappingSuggestion> = suggestions
            .iter()
            .map(|s| (s.source_column.as_str(), s))
            .collect();

        let mut decisions: BTreeMap<&str, &ConfirmedMapping> = BTreeMap::new();
        for decision in confirmed {
            if dna.column(&decision.source_column).is_none() {
                return Err(EngineError::UnknownColumn(decision.source_column.clone()));
            }
            // Last decision for a column wins within one review pass.
            decisions.insert(decision.source_column.as_str(), decision);
        }

        let mut outcomes = Vec::new();
        for column in &dna.columns {
            let Some(decision) = decisions.get(column.original_name.as_str()) else {
                continue;
            };
            let suggested = suggested_by_column
                .get(column.original_name.as_str())
                .filter(|s| !s.is_unmapped())
                .map(|s| s.target());
            let accepted = !decision.skipped
                && decision.target.is_some()
                && decision.target == suggested;

            outcomes.push(MappingOutcome {
                source_column: column.original_name.clone(),
                normalized_name: column.normalized_name.clone(),
                primary_pattern: column.primary_pattern,
                suggested,
                confirmed: decision.target.clone(),
                accepted,
                skipped: decision.skipped,
            });
        }

        Ok(HistoricalMigrationRecord {
            dna_id: dna.dna_id.clone(),
            source_system: dna.source_system.clone(),
            confirmed_mappings: outcomes,
            recorded_at: Utc::now(),
        })
    }
}
