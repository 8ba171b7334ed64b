//! Mapping suggestions and the review-boundary payloads.

use serde::{Deserialize, Serialize};

use crate::dna::{DnaId, SourceDna};
use crate::schema::TargetRef;

/// Reason string attached to a suggestion that resolved to the sentinel.
pub const NO_MATCH_REASON: &str = "No match found";

/// A lower-ranked candidate target for one source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeMapping {
    pub target_table: String,
    pub target_column: String,
    pub confidence: f32,
}

/// One proposed resolution for a source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSuggestion {
    /// Original name of the source column this resolves.
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// Confidence in [0, 1]; 0 for the sentinel.
    pub confidence: f32,
    /// Human-readable justifications, descending by contribution.
    /// Display only; never used for re-scoring.
    pub reasons: Vec<String>,
    /// Runners-up, confidence descending and strictly below the primary.
    pub alternative_mappings: Vec<AlternativeMapping>,
}

impl MappingSuggestion {
    /// The terminal suggestion for a column nothing matched.
    pub fn unmapped(source_column: impl Into<String>) -> Self {
        let sentinel = TargetRef::unmapped();
        Self {
            source_column: source_column.into(),
            target_table: sentinel.table,
            target_column: sentinel.column,
            confidence: 0.0,
            reasons: vec![NO_MATCH_REASON.to_string()],
            alternative_mappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn target(&self) -> TargetRef {
        TargetRef::new(self.target_table.clone(), self.target_column.clone())
    }

    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        self.target().is_unmapped()
    }
}

/// Outcome of human review for one source column.
///
/// Created only by the review step; immutable once written to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedMapping {
    pub source_column: String,
    /// The accepted or user-edited target; `None` when skipped.
    pub target: Option<TargetRef>,
    /// A skip is "no information", not "this mapping is wrong".
    pub skipped: bool,
}

impl ConfirmedMapping {
    /// A column the reviewer resolved to a concrete target, whether by
    /// accepting the suggestion or substituting their own.
    pub fn resolved(source_column: impl Into<String>, target: TargetRef) -> Self {
        Self {
            source_column: source_column.into(),
            target: Some(target),
            skipped: false,
        }
    }

    pub fn skipped(source_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target: None,
            skipped: true,
        }
    }
}

/// A past source similar to the one under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMigration {
    pub dna_id: DnaId,
    /// Cosine similarity in [0, 1].
    pub similarity: f32,
    pub source_system: String,
}

/// Everything the review UI needs for one profiled source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub source_dna: SourceDna,
    pub suggestions: Vec<MappingSuggestion>,
    /// Mean confidence over resolved (non-sentinel) suggestions.
    pub estimated_accuracy: f32,
    pub similar_past_migrations: Vec<SimilarMigration>,
}
