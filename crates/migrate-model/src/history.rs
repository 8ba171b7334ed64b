//! Immutable migration history consumed by the similarity index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dna::DnaId;
use crate::pattern::DataPattern;
use crate::schema::TargetRef;

/// The resolved fate of one source column in a confirmed migration.
///
/// Substitutions keep both the engine's suggestion and the human's choice so
/// negative and positive signals stay retrievable for retraining without
/// mutating prior records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingOutcome {
    pub source_column: String,
    pub normalized_name: String,
    pub primary_pattern: DataPattern,
    /// What the engine suggested; `None` when it resolved to the sentinel.
    pub suggested: Option<TargetRef>,
    /// What the human confirmed; `None` when the column was skipped.
    pub confirmed: Option<TargetRef>,
    /// True when the suggestion was taken as-is.
    pub accepted: bool,
    pub skipped: bool,
}

impl MappingOutcome {
    /// Whether this outcome may feed future affinity learning.
    /// Skipped columns carry no information and are excluded.
    #[must_use]
    pub fn is_learnable(&self) -> bool {
        !self.skipped && self.confirmed.is_some()
    }

    /// True when the human replaced the engine's suggestion: a negative
    /// signal on `suggested` and a positive one on `confirmed`.
    #[must_use]
    pub fn is_substitution(&self) -> bool {
        !self.skipped && !self.accepted && self.suggested.is_some() && self.confirmed.is_some()
    }
}

/// One completed migration, as persisted by the feedback loop.
/// Append-only; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMigrationRecord {
    pub dna_id: DnaId,
    pub source_system: String,
    pub confirmed_mappings: Vec<MappingOutcome>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoricalMigrationRecord {
    /// Outcomes eligible for affinity learning (non-skipped, confirmed).
    pub fn learnable(&self) -> impl Iterator<Item = &MappingOutcome> {
        self.confirmed_mappings.iter().filter(|o| o.is_learnable())
    }
}

/// A historical record together with the search keys the index needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub record: HistoricalMigrationRecord,
    /// Signature vector of the originating source.
    pub signature_vector: Vec<f32>,
    /// Structure hash of the originating source, for exact-duplicate lookup.
    pub structure_hash: String,
}
