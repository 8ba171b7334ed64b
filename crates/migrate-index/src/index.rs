//! Nearest-neighbor search over source signature vectors.

use std::cmp::Ordering;
use std::sync::RwLock;

use anyhow::Result;
use tracing::{debug, info};

use migrate_model::{CorpusEntry, SimilarMigration};

use crate::store::CorpusStore;

/// One corpus entry annotated with its similarity to a query vector.
#[derive(Debug, Clone)]
pub struct CorpusMatch {
    pub entry: CorpusEntry,
    /// Cosine similarity in [0, 1].
    pub similarity: f32,
}

impl CorpusMatch {
    #[must_use]
    pub fn summary(&self) -> SimilarMigration {
        SimilarMigration {
            dna_id: self.entry.record.dna_id.clone(),
            similarity: self.similarity,
            source_system: self.entry.record.source_system.clone(),
        }
    }
}

/// Append-only index over historical migration records.
///
/// Reads run concurrently with each other and with writes; a write appends
/// to the durable store first and only then publishes to readers, so a
/// reader never observes a record that did not reach storage.
pub struct SimilarityIndex<S: CorpusStore> {
    store: S,
    entries: RwLock<Vec<CorpusEntry>>,
}

impl<S: CorpusStore> SimilarityIndex<S> {
    /// Opens the index, loading the full corpus once up front so no I/O
    /// happens inside later scoring passes.
    pub fn open(store: S) -> Result<Self> {
        let entries = store.load()?;
        info!(records = entries.len(), "loaded migration history corpus");
        Ok(Self {
            store,
            entries: RwLock::new(entries),
        })
    }

    /// Appends one confirmed migration to the corpus. Never overwrites.
    pub fn add(&self, entry: CorpusEntry) -> Result<()> {
        self.store.append(&entry)?;
        debug!(dna_id = %entry.record.dna_id, "appended corpus entry");
        self.entries
            .write()
            .map_err(|_| anyhow::anyhow!("similarity index lock poisoned"))?
            .push(entry);
        Ok(())
    }

    /// Number of records currently visible to readers.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-k most similar past sources. An empty corpus yields an empty
    /// list, never an error. Ties break most-recent-first, then by dna id.
    pub fn query(&self, signature_vector: &[f32], k: usize) -> Vec<CorpusMatch> {
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let mut matches: Vec<CorpusMatch> = entries
            .iter()
            .map(|entry| CorpusMatch {
                similarity: cosine_similarity(signature_vector, &entry.signature_vector),
                entry: entry.clone(),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.entry.record.recorded_at.cmp(&a.entry.record.recorded_at))
                .then_with(|| a.entry.record.dna_id.cmp(&b.entry.record.dna_id))
        });
        matches.truncate(k);
        matches
    }

    /// Looks up a past source with an identical column signature.
    pub fn find_exact(&self, structure_hash: &str) -> Option<CorpusEntry> {
        let entries = self.entries.read().ok()?;
        entries
            .iter()
            .find(|entry| entry.structure_hash == structure_hash)
            .cloned()
    }
}

/// Cosine similarity clamped to [0, 1]. Signature vectors are non-negative,
/// so clamping only guards against rounding.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..len {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.25, 0.0, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
