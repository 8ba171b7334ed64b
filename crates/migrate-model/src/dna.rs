//! Column- and source-level fingerprints ("DNA").

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::pattern::{DataPattern, DetectedPattern, PatternCategory};

/// Fixed width of every source signature vector: one histogram slot per
/// pattern category, then mean null rate, mean unique rate, mean pattern
/// confidence, and a squashed column count.
pub const SIGNATURE_LEN: usize = PatternCategory::COUNT + 4;

/// Unique identity of one profiled source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DnaId(String);

impl DnaId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidDnaId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DnaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primitive type inferred from a column's sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Unknown,
}

impl InferredType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistical and semantic fingerprint of a single source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDna {
    pub original_name: String,
    pub normalized_name: String,
    /// Pattern matches ordered by rank; empty when nothing cleared the floor.
    pub detected_patterns: Vec<DetectedPattern>,
    /// Highest-ranked pattern, or `Unknown` when `detected_patterns` is empty.
    pub primary_pattern: DataPattern,
    /// Confidence of the primary pattern, in [0, 1].
    pub pattern_confidence: f32,
    /// Bounded raw examples, kept for display and debugging only.
    pub sample_values: Vec<String>,
    pub null_percentage: f64,
    pub unique_percentage: f64,
    /// Mean string length of non-null samples.
    pub avg_length: f64,
    pub data_type_inferred: InferredType,
}

impl ColumnDna {
    /// Checks the structural invariant: confidence in [0, 1] and the primary
    /// pattern either detected or the `Unknown` sentinel.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let confidence_ok = (0.0..=1.0).contains(&self.pattern_confidence);
        let primary_ok = self.primary_pattern == DataPattern::Unknown
            || self
                .detected_patterns
                .iter()
                .any(|d| d.pattern == self.primary_pattern);
        confidence_ok && primary_ok
    }
}

/// Fingerprint of a whole import source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDna {
    pub dna_id: DnaId,
    pub source_type: String,
    pub source_system: String,
    pub column_count: usize,
    pub row_count: usize,
    /// Per-column fingerprints in source column order.
    pub columns: Vec<ColumnDna>,
    /// Stable hash of the ordered (normalized name, inferred type) signature.
    pub structure_hash: String,
    /// Fixed-length embedding for approximate similarity search.
    pub signature_vector: Vec<f32>,
    pub detected_at: DateTime<Utc>,
}

impl SourceDna {
    #[must_use]
    pub fn column(&self, original_name: &str) -> Option<&ColumnDna> {
        self.columns.iter().find(|c| c.original_name == original_name)
    }
}
