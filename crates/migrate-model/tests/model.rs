use chrono::Utc;
use migrate_model::{
    AlternativeMapping, ColumnDna, ConfirmedMapping, DataPattern, DetectedPattern, DnaId,
    HistoricalMigrationRecord, InferredType, MappingOutcome, MappingSuggestion, TargetRef,
};

fn column_dna(primary: DataPattern, detected: Vec<DetectedPattern>, confidence: f32) -> ColumnDna {
    ColumnDna {
        original_name: "col".to_string(),
        normalized_name: "col".to_string(),
        detected_patterns: detected,
        primary_pattern: primary,
        pattern_confidence: confidence,
        sample_values: vec![],
        null_percentage: 0.0,
        unique_percentage: 1.0,
        avg_length: 4.0,
        data_type_inferred: InferredType::String,
    }
}

#[test]
fn column_invariant_accepts_detected_primary() {
    let dna = column_dna(
        DataPattern::Email,
        vec![DetectedPattern {
            pattern: DataPattern::Email,
            confidence: 0.95,
        }],
        0.95,
    );
    assert!(dna.invariants_hold());
}

#[test]
fn column_invariant_accepts_unknown_fallback_with_empty_detections() {
    let dna = column_dna(DataPattern::Unknown, vec![], 0.1);
    assert!(dna.invariants_hold());
}

#[test]
fn column_invariant_rejects_primary_outside_detections() {
    let dna = column_dna(
        DataPattern::Npi,
        vec![DetectedPattern {
            pattern: DataPattern::Email,
            confidence: 0.9,
        }],
        0.9,
    );
    assert!(!dna.invariants_hold());
}

#[test]
fn column_invariant_rejects_out_of_range_confidence() {
    let dna = column_dna(DataPattern::Unknown, vec![], 1.5);
    assert!(!dna.invariants_hold());
}

#[test]
fn unmapped_suggestion_is_terminal_not_error() {
    let suggestion = MappingSuggestion::unmapped("mystery");
    assert!(suggestion.is_unmapped());
    assert_eq!(suggestion.confidence, 0.0);
    assert_eq!(suggestion.reasons, vec!["No match found".to_string()]);
    assert!(suggestion.alternative_mappings.is_empty());
}

#[test]
fn dna_id_rejects_blank() {
    assert!(DnaId::new("  ").is_err());
    assert!(DnaId::new("dna-001").is_ok());
}

#[test]
fn learnable_set_excludes_skipped_outcomes() {
    let record = HistoricalMigrationRecord {
        dna_id: DnaId::new("dna-001").unwrap(),
        source_system: "EPIC".to_string(),
        confirmed_mappings: vec![
            MappingOutcome {
                source_column: "first_name".to_string(),
                normalized_name: "first name".to_string(),
                primary_pattern: DataPattern::NameFirst,
                suggested: Some(TargetRef::new("hc_staff", "first_name")),
                confirmed: Some(TargetRef::new("hc_staff", "first_name")),
                accepted: true,
                skipped: false,
            },
            MappingOutcome {
                source_column: "legacy_flag".to_string(),
                normalized_name: "legacy flag".to_string(),
                primary_pattern: DataPattern::Unknown,
                suggested: None,
                confirmed: None,
                accepted: false,
                skipped: true,
            },
        ],
        recorded_at: Utc::now(),
    };
    let learnable: Vec<_> = record.learnable().collect();
    assert_eq!(learnable.len(), 1);
    assert_eq!(learnable[0].source_column, "first_name");
}

#[test]
fn substitution_keeps_both_signals() {
    let outcome = MappingOutcome {
        source_column: "clin_no".to_string(),
        normalized_name: "clin no".to_string(),
        primary_pattern: DataPattern::EmployeeId,
        suggested: Some(TargetRef::new("hc_staff", "employee_id")),
        confirmed: Some(TargetRef::new("hc_staff", "npi")),
        accepted: false,
        skipped: false,
    };
    assert!(outcome.is_substitution());
    assert!(outcome.is_learnable());
}

#[test]
fn confirmed_mapping_constructors() {
    let resolved = ConfirmedMapping::resolved("email", TargetRef::new("hc_staff", "email"));
    assert!(!resolved.skipped);
    assert!(resolved.target.is_some());

    let skipped = ConfirmedMapping::skipped("notes");
    assert!(skipped.skipped);
    assert!(skipped.target.is_none());
}

#[test]
fn suggestion_round_trips_through_json() {
    let suggestion = MappingSuggestion {
        source_column: "emp_email".to_string(),
        target_table: "hc_staff".to_string(),
        target_column: "email".to_string(),
        confidence: 0.91,
        reasons: vec!["Pattern match: EMAIL (95%)".to_string()],
        alternative_mappings: vec![AlternativeMapping {
            target_table: "hc_patients".to_string(),
            target_column: "email".to_string(),
            confidence: 0.74,
        }],
    };
    let json = serde_json::to_string(&suggestion).expect("serialize");
    let back: MappingSuggestion = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, suggestion);
}
