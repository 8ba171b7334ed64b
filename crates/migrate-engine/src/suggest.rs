//! Confidence-ranked mapping suggestions for a profiled source.
//!
//! Three signals feed each candidate target: pattern-to-schema affinity,
//! name similarity, and the historical prior from similar past migrations.
//! The combination is a weighted mean, so raising any one signal can never
//! lower the final confidence, and every tie-break is deterministic.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use migrate_model::{
    AlternativeMapping, ColumnDna, MappingSuggestion, ReviewPayload, SourceDna, TargetField,
    TargetRef, TargetSchema, normalize_name,
};

use migrate_index::{CorpusMatch, CorpusStore, SimilarityIndex};

use crate::affinity::AffinityTable;

/// Weight for a substituted-away suggestion relative to a positive vote.
const SUBSTITUTION_PENALTY: f32 = 0.5;
/// Contributions below this share of the total are left out of `reasons`.
const REASON_FLOOR: f32 = 0.05;

/// Relative weights of the three scoring signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalWeights {
    pub pattern: f32,
    pub name: f32,
    pub history: f32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            pattern: 0.5,
            name: 0.3,
            history: 0.2,
        }
    }
}

/// Tuning parameters for the suggester. All configurable; the floor and
/// top-k deliberately live here rather than as constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuggesterConfig {
    /// Below this, a column resolves to the UNMAPPED sentinel.
    pub min_confidence: f32,
    /// How many similar past migrations inform the historical prior.
    pub top_k: usize,
    /// Maximum number of alternatives carried per suggestion.
    pub max_alternatives: usize,
    pub weights: SignalWeights,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.35,
            top_k: 5,
            max_alternatives: 3,
            weights: SignalWeights::default(),
        }
    }
}

/// Weighted-mean combination of the available signals.
///
/// When the historical prior is absent (empty or unavailable corpus) the
/// mean renormalizes over the remaining weights, so degraded scoring stays
/// in [0, 1] and comparable across columns.
#[must_use]
pub fn combine_signals(weights: &SignalWeights, affinity: f32, name: f32, history: Option<f32>) -> f32 {
    let (sum, total) = match history {
        Some(h) => (
            weights.pattern * affinity + weights.name * name + weights.history * h,
            weights.pattern + weights.name + weights.history,
        ),
        None => (
            weights.pattern * affinity + weights.name * name,
            weights.pattern + weights.name,
        ),
    };
    if total <= 0.0 { 0.0 } else { (sum / total).clamp(0.0, 1.0) }
}

struct ScoredCandidate {
    target: TargetRef,
    affinity: f32,
    name: f32,
    history: Option<f32>,
    confidence: f32,
}

/// Suggests target-field mappings for every column of a source.
///
/// The schema, affinity table, and similarity index are injected so multiple
/// tenants and target schemas can run concurrently without cross-talk.
pub struct MappingSuggester {
    schema: TargetSchema,
    affinity: AffinityTable,
    config: SuggesterConfig,
}

impl MappingSuggester {
    pub fn new(schema: TargetSchema, affinity: AffinityTable, config: SuggesterConfig) -> Self {
        Self {
            schema,
            affinity,
            config,
        }
    }

    /// Produces the full review payload for one profiled source.
    ///
    /// `index = None` means the historical corpus is unavailable; scoring
    /// degrades to pattern affinity and name similarity and says so in the
    /// reasons. It never aborts the pass.
    pub fn suggest<S: CorpusStore>(
        &self,
        dna: &SourceDna,
        index: Option<&SimilarityIndex<S>>,
    ) -> ReviewPayload {
        let matches: Vec<CorpusMatch> = index
            .map(|idx| idx.query(&dna.signature_vector, self.config.top_k))
            .unwrap_or_default();
        let corpus_available = index.is_some();

        let suggestions: Vec<MappingSuggestion> = dna
            .columns
            .iter()
            .map(|column| self.suggest_column(column, &matches, corpus_available))
            .collect();

        let resolved: Vec<f32> = suggestions
            .iter()
            .filter(|s| !s.is_unmapped())
            .map(|s| s.confidence)
            .collect();
        let estimated_accuracy = if resolved.is_empty() {
            0.0
        } else {
            resolved.iter().sum::<f32>() / resolved.len() as f32
        };

        debug!(
            columns = dna.columns.len(),
            resolved = resolved.len(),
            estimated_accuracy,
            "suggestion pass complete"
        );

        ReviewPayload {
            source_dna: dna.clone(),
            suggestions,
            estimated_accuracy,
            similar_past_migrations: matches.iter().map(CorpusMatch::summary).collect(),
        }
    }

    fn suggest_column(
        &self,
        column: &ColumnDna,
        matches: &[CorpusMatch],
        corpus_available: bool,
    ) -> MappingSuggestion {
        let votes = historical_votes(column, matches);
        // An empty corpus scores exactly like an absent one; only the
        // reasons say when the index itself was unavailable.
        let has_prior = !matches.is_empty();

        let mut candidates: Vec<ScoredCandidate> = self
            .schema
            .fields
            .iter()
            .map(|field| self.score_candidate(column, field, &votes, has_prior))
            .collect();

        candidates.sort_by(compare_candidates);

        let Some(top) = candidates.first() else {
            return MappingSuggestion::unmapped(column.original_name.clone());
        };
        if top.confidence < self.config.min_confidence {
            return MappingSuggestion::unmapped(column.original_name.clone());
        }

        let primary_confidence = top.confidence;
        let reasons = self.build_reasons(column, top, corpus_available);
        let alternative_mappings: Vec<AlternativeMapping> = candidates
            .iter()
            .skip(1)
            .filter(|c| c.confidence > 0.0 && c.confidence < primary_confidence)
            .take(self.config.max_alternatives)
            .map(|c| AlternativeMapping {
                target_table: c.target.table.clone(),
                target_column: c.target.column.clone(),
                confidence: c.confidence,
            })
            .collect();

        MappingSuggestion {
            source_column: column.original_name.clone(),
            target_table: top.target.table.clone(),
            target_column: top.target.column.clone(),
            confidence: primary_confidence,
            reasons,
            alternative_mappings,
        }
    }

    fn score_candidate(
        &self,
        column: &ColumnDna,
        field: &TargetField,
        votes: &BTreeMap<TargetRef, f32>,
        has_prior: bool,
    ) -> ScoredCandidate {
        let target = field.target_ref();

        let affinity = self.affinity.affinity(column.primary_pattern, &target)
            * column.pattern_confidence;
        let name = name_similarity(&column.normalized_name, field);
        let history = if has_prior {
            Some(votes.get(&target).copied().unwrap_or(0.0))
        } else {
            None
        };

        let confidence = combine_signals(&self.config.weights, affinity, name, history);
        ScoredCandidate {
            target,
            affinity,
            name,
            history,
            confidence,
        }
    }

    /// Reasons list every signal that contributed non-trivially, in
    /// descending order of contribution. Display only.
    fn build_reasons(
        &self,
        column: &ColumnDna,
        top: &ScoredCandidate,
        corpus_available: bool,
    ) -> Vec<String> {
        let weights = &self.config.weights;
        let total = if top.history.is_some() {
            weights.pattern + weights.name + weights.history
        } else {
            weights.pattern + weights.name
        };

        let mut contributions: Vec<(f32, String)> = Vec::new();
        let pattern_share = weights.pattern * top.affinity / total;
        if pattern_share > REASON_FLOOR {
            contributions.push((
                pattern_share,
                format!(
                    "Pattern match: {} \u{2192} {} ({:.0}%)",
                    column.primary_pattern,
                    top.target,
                    top.affinity * 100.0
                ),
            ));
        }
        let name_share = weights.name * top.name / total;
        if name_share > REASON_FLOOR {
            contributions.push((
                name_share,
                format!(
                    "Name similarity: '{}' \u{2248} '{}' ({:.0}%)",
                    column.normalized_name,
                    top.target.column,
                    top.name * 100.0
                ),
            ));
        }
        if let Some(history) = top.history {
            let history_share = weights.history * history / total;
            if history_share > REASON_FLOOR {
                contributions.push((
                    history_share,
                    format!(
                        "Historical precedent: similar migrations mapped to {} ({:.0}%)",
                        top.target,
                        history * 100.0
                    ),
                ));
            }
        }

        contributions.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        let mut reasons: Vec<String> = contributions.into_iter().map(|(_, r)| r).collect();
        if !corpus_available {
            reasons.push("Historical corpus unavailable; scored without prior".to_string());
        }
        reasons
    }
}

/// Total ordering over candidates: confidence, then pattern affinity, then
/// name similarity, then lexical target identity.
fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.affinity.partial_cmp(&a.affinity).unwrap_or(Ordering::Equal))
        .then_with(|| b.name.partial_cmp(&a.name).unwrap_or(Ordering::Equal))
        .then_with(|| a.target.cmp(&b.target))
}

/// Similarity-weighted votes from past migrations for targets analogous
/// columns were confirmed into. Substitutions vote against the target the
/// engine originally suggested.
fn historical_votes(column: &ColumnDna, matches: &[CorpusMatch]) -> BTreeMap<TargetRef, f32> {
    let mut votes: BTreeMap<TargetRef, f32> = BTreeMap::new();
    for m in matches {
        for outcome in m.entry.record.learnable() {
            let analogous = outcome.primary_pattern == column.primary_pattern
                || outcome.normalized_name == column.normalized_name;
            if !analogous {
                continue;
            }
            if let Some(confirmed) = &outcome.confirmed {
                *votes.entry(confirmed.clone()).or_default() += m.similarity;
            }
            if outcome.is_substitution()
                && let Some(suggested) = &outcome.suggested
            {
                *votes.entry(suggested.clone()).or_default() -=
                    SUBSTITUTION_PENALTY * m.similarity;
            }
        }
    }
    for vote in votes.values_mut() {
        *vote = vote.clamp(0.0, 1.0);
    }
    votes
}

/// Best Jaro-Winkler similarity between a normalized column name and a
/// field's own name or any of its synonyms.
fn name_similarity(normalized_column: &str, field: &TargetField) -> f32 {
    let mut best = jaro_similarity(
        normalized_column.chars(),
        normalize_name(&field.column).chars(),
    );
    for synonym in &field.synonyms {
        let score = jaro_similarity(normalized_column.chars(), normalize_name(synonym).chars());
        best = best.max(score);
    }
    best as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_renormalizes_without_history() {
        let weights = SignalWeights::default();
        let with = combine_signals(&weights, 0.8, 0.8, Some(0.8));
        let without = combine_signals(&weights, 0.8, 0.8, None);
        assert!((with - 0.8).abs() < 1e-6);
        assert!((without - 0.8).abs() < 1e-6);
    }

    #[test]
    fn combine_stays_in_unit_interval() {
        let weights = SignalWeights::default();
        assert_eq!(combine_signals(&weights, 0.0, 0.0, None), 0.0);
        assert_eq!(combine_signals(&weights, 1.0, 1.0, Some(1.0)), 1.0);
    }

    #[test]
    fn name_similarity_uses_synonyms() {
        let field =
            TargetField::new("hc_staff", "email").with_synonyms(&["emp_email", "work_email"]);
        let direct = name_similarity("emp email", &field);
        assert!(direct > 0.95, "synonym should dominate, got {direct}");
    }
}
