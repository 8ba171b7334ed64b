//! Whole-source fingerprint assembly.
//!
//! Runs the profiler and detector over every column independently (no shared
//! mutable state, columns in parallel) and joins the results into one
//! `SourceDna`. Extraction is a pure function of the input sample and the
//! sampling seed except for `dna_id` and `detected_at`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use migrate_model::{
    ColumnDna, DnaId, PatternCategory, RawSource, SIGNATURE_LEN, SourceDna, normalize_name,
};

use crate::detector::{DetectorConfig, detect};
use crate::error::ProfileError;
use crate::profiler::{SamplerConfig, profile_column};

/// Sample values carried on each `ColumnDna` for display.
const DISPLAY_SAMPLE_LIMIT: usize = 5;

static DNA_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Profiles a whole source into its DNA fingerprint.
#[derive(Debug, Clone, Default)]
pub struct SourceDnaExtractor {
    sampler: SamplerConfig,
    detector: DetectorConfig,
}

impl SourceDnaExtractor {
    pub fn new(sampler: SamplerConfig, detector: DetectorConfig) -> Self {
        Self { sampler, detector }
    }

    /// Extracts the `SourceDna` for one source.
    ///
    /// A source with no columns at all is the only hard failure; columns
    /// that profile degenerately are kept with conservative defaults.
    pub fn extract(&self, source: &RawSource) -> Result<SourceDna, ProfileError> {
        if source.columns.is_empty() {
            return Err(ProfileError::EmptySource);
        }
        if source.rows.is_empty() {
            warn!(
                source_system = source.source_system,
                "source has no rows; every column profiles as all-null"
            );
        }

        let columns: Vec<ColumnDna> = (0..source.columns.len())
            .into_par_iter()
            .map(|idx| self.profile_one(source, idx))
            .collect();

        for column in &columns {
            if column.null_percentage >= 1.0 {
                warn!(
                    column = column.original_name,
                    "column is entirely null; profiled with conservative defaults"
                );
            }
        }

        let structure_hash = structure_hash(&columns);
        let signature_vector = signature_vector(&columns);
        debug!(
            column_count = columns.len(),
            structure_hash, "assembled source dna"
        );

        Ok(SourceDna {
            dna_id: generate_dna_id(&structure_hash),
            source_type: source.source_type.clone(),
            source_system: source.source_system.clone(),
            column_count: source.column_count(),
            row_count: source.row_count(),
            columns,
            structure_hash,
            signature_vector,
            detected_at: Utc::now(),
        })
    }

    fn profile_one(&self, source: &RawSource, idx: usize) -> ColumnDna {
        let original_name = source.columns[idx].clone();
        let values = source.column_values(idx);
        let profile = profile_column(&values, &self.sampler);
        let detection = detect(&original_name, &profile, &self.detector);

        let sample_values: Vec<String> = profile
            .sampled_values
            .iter()
            .take(DISPLAY_SAMPLE_LIMIT)
            .cloned()
            .collect();

        ColumnDna {
            normalized_name: normalize_name(&original_name),
            original_name,
            detected_patterns: detection.detected_patterns(),
            primary_pattern: detection.primary,
            pattern_confidence: detection.confidence,
            sample_values,
            null_percentage: profile.null_ratio,
            unique_percentage: profile.unique_ratio,
            avg_length: profile.avg_length,
            data_type_inferred: profile.inferred_type,
        }
    }
}

/// Stable hash over the ordered (normalized name, inferred type) signature.
/// Row data never feeds this hash, so two sources with identical column
/// signatures collide regardless of content.
pub fn structure_hash(columns: &[ColumnDna]) -> String {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update(column.normalized_name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(column.data_type_inferred.as_str().as_bytes());
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

/// Fixed-length embedding: primary-pattern category histogram, mean null and
/// unique rates, mean pattern confidence, and a squashed column count.
pub fn signature_vector(columns: &[ColumnDna]) -> Vec<f32> {
    let mut vector = vec![0.0f32; SIGNATURE_LEN];
    if columns.is_empty() {
        return vector;
    }
    let n = columns.len() as f32;
    for column in columns {
        vector[column.primary_pattern.category().index()] += 1.0 / n;
    }
    let base = PatternCategory::COUNT;
    vector[base] = columns.iter().map(|c| c.null_percentage as f32).sum::<f32>() / n;
    vector[base + 1] = columns
        .iter()
        .map(|c| c.unique_percentage as f32)
        .sum::<f32>()
        / n;
    vector[base + 2] = columns.iter().map(|c| c.pattern_confidence).sum::<f32>() / n;
    vector[base + 3] = n / (n + 16.0);
    vector
}

/// Unique per extraction; everything else about the DNA is deterministic.
fn generate_dna_id(structure_hash: &str) -> DnaId {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let counter = DNA_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(structure_hash.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(counter.to_le_bytes());
    let digest = hasher.finalize();
    DnaId::new(hex::encode(&digest[..16])).expect("hex id is never blank")
}
