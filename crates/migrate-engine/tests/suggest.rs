use chrono::Utc;
use proptest::prelude::*;

use migrate_engine::{
    MappingSuggester, SignalWeights, SuggesterConfig, combine_signals, default_affinity_table,
    default_target_schema,
};
use migrate_index::{MemoryCorpusStore, SimilarityIndex};
use migrate_model::{
    CorpusEntry, DataPattern, DnaId, HistoricalMigrationRecord, MappingOutcome, NO_MATCH_REASON,
    RawSource, ReviewPayload, SourceDna, TargetRef, UNMAPPED,
};
use migrate_profile::SourceDnaExtractor;

fn suggester() -> MappingSuggester {
    MappingSuggester::new(
        default_target_schema(),
        default_affinity_table(),
        SuggesterConfig::default(),
    )
}

fn extract(columns: &[&str], rows: &[&[&str]]) -> SourceDna {
    let source = RawSource::new(
        "legacy_ehr",
        "CSV",
        columns.iter().map(|c| (*c).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect(),
    );
    SourceDnaExtractor::default()
        .extract(&source)
        .expect("extract dna")
}

fn empty_index() -> SimilarityIndex<MemoryCorpusStore> {
    SimilarityIndex::open(MemoryCorpusStore::new()).expect("open index")
}

fn suggest_with_empty_corpus(dna: &SourceDna) -> ReviewPayload {
    suggester().suggest(dna, Some(&empty_index()))
}

#[test]
fn first_name_column_maps_to_staff_first_name_with_high_confidence() {
    let dna = extract(&["first_name"], &[&["John"], &["Jane"], &["Bob"]]);
    let payload = suggest_with_empty_corpus(&dna);

    let suggestion = &payload.suggestions[0];
    assert_eq!(suggestion.target_table, "hc_staff");
    assert_eq!(suggestion.target_column, "first_name");
    assert!(
        suggestion.confidence >= 0.9,
        "expected >= 0.9, got {}",
        suggestion.confidence
    );
}

#[test]
fn emp_email_maps_to_staff_email_with_patient_alternative() {
    let dna = extract(
        &["emp_email"],
        &[
            &["john.smith@clinic.org"],
            &["jane.doe@clinic.org"],
            &["bob.ray@clinic.org"],
        ],
    );
    let payload = suggest_with_empty_corpus(&dna);

    let suggestion = &payload.suggestions[0];
    assert_eq!(suggestion.target_table, "hc_staff");
    assert_eq!(suggestion.target_column, "email");

    let first_alt = suggestion
        .alternative_mappings
        .first()
        .expect("at least one alternative");
    assert_eq!(first_alt.target_table, "hc_patients");
    assert_eq!(first_alt.target_column, "email");
    assert!(first_alt.confidence < suggestion.confidence);
}

#[test]
fn unmatched_column_resolves_to_the_unmapped_sentinel() {
    let dna = extract(&["unknown_field"], &[&["xq9"], &["zz14"], &["qqq"]]);
    let payload = suggest_with_empty_corpus(&dna);

    let suggestion = &payload.suggestions[0];
    assert_eq!(suggestion.target_table, UNMAPPED);
    assert_eq!(suggestion.target_column, UNMAPPED);
    assert_eq!(suggestion.confidence, 0.0);
    assert_eq!(suggestion.reasons, vec![NO_MATCH_REASON.to_string()]);
    assert!(suggestion.alternative_mappings.is_empty());
}

#[test]
fn alternatives_are_sorted_strictly_below_and_never_duplicate_the_primary() {
    let dna = extract(
        &["first_name", "emp_email", "work_phone"],
        &[
            &["John", "j@clinic.org", "555-867-5309"],
            &["Jane", "d@clinic.org", "555-251-0199"],
        ],
    );
    let payload = suggest_with_empty_corpus(&dna);

    for suggestion in payload.suggestions.iter().filter(|s| !s.is_unmapped()) {
        let mut previous = suggestion.confidence;
        for alt in &suggestion.alternative_mappings {
            assert!(alt.confidence < suggestion.confidence);
            assert!(alt.confidence <= previous);
            assert!(alt.confidence > 0.0);
            assert!(
                (alt.target_table.as_str(), alt.target_column.as_str())
                    != (
                        suggestion.target_table.as_str(),
                        suggestion.target_column.as_str()
                    ),
                "alternative duplicates the primary"
            );
            previous = alt.confidence;
        }
    }
}

#[test]
fn reasons_are_ordered_by_contribution() {
    let dna = extract(&["first_name"], &[&["John"], &["Jane"], &["Bob"]]);
    let payload = suggest_with_empty_corpus(&dna);

    let reasons = &payload.suggestions[0].reasons;
    assert!(
        reasons[0].starts_with("Pattern match:"),
        "strongest signal first, got {reasons:?}"
    );
    assert!(reasons.iter().any(|r| r.starts_with("Name similarity:")));
}

#[test]
fn missing_corpus_degrades_gracefully_and_says_so() {
    let dna = extract(&["emp_email"], &[&["a@b.org"], &["c@d.org"]]);
    let payload = suggester().suggest(&dna, None::<&SimilarityIndex<MemoryCorpusStore>>);

    assert!(payload.similar_past_migrations.is_empty());
    let suggestion = &payload.suggestions[0];
    assert!(!suggestion.is_unmapped());
    assert!(
        suggestion
            .reasons
            .iter()
            .any(|r| r.contains("corpus unavailable")),
        "degraded scoring should be visible in reasons: {:?}",
        suggestion.reasons
    );
}

#[test]
fn empty_corpus_scores_identically_to_no_corpus() {
    let dna = extract(&["emp_email"], &[&["a@b.org"], &["c@d.org"]]);
    let without = suggester().suggest(&dna, None::<&SimilarityIndex<MemoryCorpusStore>>);
    let with_empty = suggest_with_empty_corpus(&dna);

    assert_eq!(
        without.suggestions[0].confidence,
        with_empty.suggestions[0].confidence
    );
    assert_eq!(
        without.suggestions[0].target_table,
        with_empty.suggestions[0].target_table
    );
}

#[test]
fn historical_prior_can_override_the_static_affinity_ranking() {
    let dna = extract(
        &["emp_email"],
        &[&["a@clinic.org"], &["b@clinic.org"], &["c@clinic.org"]],
    );
    // Baseline without history prefers the staff table.
    let baseline = suggest_with_empty_corpus(&dna);
    assert_eq!(baseline.suggestions[0].target_table, "hc_staff");

    // One maximally similar past migration where a human substituted the
    // patient table for the same column.
    let index = empty_index();
    index
        .add(CorpusEntry {
            record: HistoricalMigrationRecord {
                dna_id: DnaId::new("past-migration").unwrap(),
                source_system: "legacy_ehr".to_string(),
                confirmed_mappings: vec![MappingOutcome {
                    source_column: "emp_email".to_string(),
                    normalized_name: "emp email".to_string(),
                    primary_pattern: DataPattern::Email,
                    suggested: Some(TargetRef::new("hc_staff", "email")),
                    confirmed: Some(TargetRef::new("hc_patients", "email")),
                    accepted: false,
                    skipped: false,
                }],
                recorded_at: Utc::now(),
            },
            signature_vector: dna.signature_vector.clone(),
            structure_hash: dna.structure_hash.clone(),
        })
        .expect("seed corpus");

    let informed = suggester().suggest(&dna, Some(&index));
    let suggestion = &informed.suggestions[0];
    assert_eq!(suggestion.target_table, "hc_patients");
    assert_eq!(suggestion.target_column, "email");
    assert!(
        suggestion
            .reasons
            .iter()
            .any(|r| r.starts_with("Historical precedent:")),
        "prior should be surfaced: {:?}",
        suggestion.reasons
    );
    assert_eq!(informed.similar_past_migrations.len(), 1);
}

#[test]
fn estimated_accuracy_is_the_mean_over_resolved_columns() {
    let dna = extract(
        &["first_name", "unknown_field"],
        &[&["John", "xq9"], &["Jane", "zz14"]],
    );
    let payload = suggest_with_empty_corpus(&dna);

    let resolved: Vec<f32> = payload
        .suggestions
        .iter()
        .filter(|s| !s.is_unmapped())
        .map(|s| s.confidence)
        .collect();
    assert_eq!(resolved.len(), 1);
    let expected = resolved.iter().sum::<f32>() / resolved.len() as f32;
    assert!((payload.estimated_accuracy - expected).abs() < 1e-6);
}

#[test]
fn estimated_accuracy_is_zero_when_nothing_resolves() {
    let dna = extract(&["unknown_field"], &[&["xq9"], &["zz14"]]);
    let payload = suggest_with_empty_corpus(&dna);
    assert_eq!(payload.estimated_accuracy, 0.0);
}

proptest! {
    #[test]
    fn combined_confidence_stays_in_unit_interval(
        affinity in 0.0f32..=1.0,
        name in 0.0f32..=1.0,
        history in 0.0f32..=1.0,
    ) {
        let weights = SignalWeights::default();
        let with = combine_signals(&weights, affinity, name, Some(history));
        let without = combine_signals(&weights, affinity, name, None);
        prop_assert!((0.0..=1.0).contains(&with));
        prop_assert!((0.0..=1.0).contains(&without));
    }

    #[test]
    fn raising_any_signal_never_lowers_the_combination(
        affinity in 0.0f32..=1.0,
        name in 0.0f32..=1.0,
        history in 0.0f32..=1.0,
        bump in 0.0f32..=1.0,
    ) {
        let weights = SignalWeights::default();
        let base = combine_signals(&weights, affinity, name, Some(history));
        prop_assert!(
            combine_signals(&weights, (affinity + bump).min(1.0), name, Some(history)) >= base
        );
        prop_assert!(
            combine_signals(&weights, affinity, (name + bump).min(1.0), Some(history)) >= base
        );
        prop_assert!(
            combine_signals(&weights, affinity, name, Some((history + bump).min(1.0))) >= base
        );
    }
}
