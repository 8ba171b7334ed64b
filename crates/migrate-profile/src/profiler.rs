//! Statistical profiling of one column's sample values.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use migrate_model::InferredType;

static DATE_SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$",
        r"^\d{1,2}/\d{1,2}/\d{2,4}$",
        r"^\d{1,2}-[A-Za-z]{3}-\d{2,4}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static date regex"))
    .collect()
});

/// Bounded, seeded sampling parameters. Profiling cost stays independent of
/// total row count; results are deterministic for a fixed seed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Maximum number of values considered per column.
    pub max_samples: usize,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_samples: 256,
            seed: 0,
        }
    }
}

/// Statistical features of one column's bounded sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    /// Fraction of sampled values that were null, in [0, 1].
    pub null_ratio: f64,
    /// Distinct fraction over non-null sampled values, in [0, 1].
    pub unique_ratio: f64,
    /// Mean string length of non-null sampled values.
    pub avg_length: f64,
    pub inferred_type: InferredType,
    /// The non-null values that were actually sampled, in source order.
    pub sampled_values: Vec<String>,
    /// Total sampled values including nulls.
    pub sampled_count: usize,
}

/// Profiles a bounded sample of one column's raw values.
///
/// Degenerate inputs never fail: an empty or all-null column yields
/// `null_ratio = 1.0`, `unique_ratio = 0.0` and `InferredType::Unknown`.
pub fn profile_column(values: &[Option<&str>], config: &SamplerConfig) -> ColumnProfile {
    let indices = sample_indices(values.len(), config);
    let sampled_count = indices.len();

    let mut non_null: Vec<&str> = Vec::new();
    for &idx in &indices {
        if let Some(value) = values[idx] {
            non_null.push(value);
        }
    }

    if non_null.is_empty() {
        return ColumnProfile {
            null_ratio: 1.0,
            unique_ratio: 0.0,
            avg_length: 0.0,
            inferred_type: InferredType::Unknown,
            sampled_values: Vec::new(),
            sampled_count,
        };
    }

    let nulls = sampled_count - non_null.len();
    let null_ratio = nulls as f64 / sampled_count as f64;

    let distinct: BTreeSet<&str> = non_null.iter().copied().collect();
    let unique_ratio = distinct.len() as f64 / non_null.len() as f64;

    let total_len: usize = non_null.iter().map(|v| v.chars().count()).sum();
    let avg_length = total_len as f64 / non_null.len() as f64;

    ColumnProfile {
        null_ratio,
        unique_ratio,
        avg_length,
        inferred_type: infer_type(&non_null),
        sampled_values: non_null.iter().map(|v| (*v).to_string()).collect(),
        sampled_count,
    }
}

/// Best-effort primitive inference: integer, then float, then boolean,
/// then date, falling back to string.
fn infer_type(values: &[&str]) -> InferredType {
    if values.is_empty() {
        return InferredType::Unknown;
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return InferredType::Integer;
    }
    if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        return InferredType::Float;
    }
    if values.iter().all(|v| is_boolean_token(v)) {
        return InferredType::Boolean;
    }
    if values.iter().all(|v| is_date_shaped(v)) {
        return InferredType::Date;
    }
    InferredType::String
}

pub(crate) fn is_boolean_token(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "y" | "n" | "t" | "f"
    )
}

pub(crate) fn is_date_shaped(value: &str) -> bool {
    DATE_SHAPES.iter().any(|re| re.is_match(value))
}

/// Deterministic bounded sampling: everything when the column fits the
/// budget, otherwise a head slice plus a seeded spread over the remainder.
fn sample_indices(len: usize, config: &SamplerConfig) -> Vec<usize> {
    let max = config.max_samples.max(1);
    if len <= max {
        return (0..len).collect();
    }
    let head = max / 2;
    let mut indices: BTreeSet<usize> = (0..head).collect();
    let mut state = config.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    while indices.len() < max {
        state = splitmix64(&mut state);
        let idx = head + (state as usize % (len - head));
        indices.insert(idx);
    }
    indices.into_iter().collect()
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(values: &[&'static str]) -> Vec<Option<&'static str>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(*v) })
            .collect()
    }

    #[test]
    fn all_null_column_uses_conservative_defaults() {
        let profile = profile_column(&[None, None, None], &SamplerConfig::default());
        assert_eq!(profile.null_ratio, 1.0);
        assert_eq!(profile.unique_ratio, 0.0);
        assert_eq!(profile.inferred_type, InferredType::Unknown);
    }

    #[test]
    fn empty_column_does_not_panic() {
        let profile = profile_column(&[], &SamplerConfig::default());
        assert_eq!(profile.null_ratio, 1.0);
        assert_eq!(profile.inferred_type, InferredType::Unknown);
    }

    #[test]
    fn integer_beats_float_in_inference_order() {
        let values = opt(&["1", "2", "300"]);
        let profile = profile_column(&values, &SamplerConfig::default());
        assert_eq!(profile.inferred_type, InferredType::Integer);
    }

    #[test]
    fn mixed_decimal_infers_float() {
        let values = opt(&["1.5", "2", "3.25"]);
        let profile = profile_column(&values, &SamplerConfig::default());
        assert_eq!(profile.inferred_type, InferredType::Float);
    }

    #[test]
    fn boolean_tokens_infer_boolean() {
        let values = opt(&["yes", "no", "YES"]);
        let profile = profile_column(&values, &SamplerConfig::default());
        assert_eq!(profile.inferred_type, InferredType::Boolean);
    }

    #[test]
    fn iso_dates_infer_date() {
        let values = opt(&["2024-01-15", "2023-11-02", "2024-06-30"]);
        let profile = profile_column(&values, &SamplerConfig::default());
        assert_eq!(profile.inferred_type, InferredType::Date);
    }

    #[test]
    fn null_and_unique_ratios() {
        let values = opt(&["a", "", "a", "b"]);
        let profile = profile_column(&values, &SamplerConfig::default());
        assert!((profile.null_ratio - 0.25).abs() < 1e-9);
        // 2 distinct over 3 non-null
        assert!((profile.unique_ratio - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn sampling_is_deterministic_for_fixed_seed() {
        let config = SamplerConfig {
            max_samples: 16,
            seed: 7,
        };
        let a = sample_indices(1000, &config);
        let b = sample_indices(1000, &config);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.iter().all(|&i| i < 1000));
    }

    #[test]
    fn different_seeds_sample_differently_on_large_columns() {
        let a = sample_indices(
            10_000,
            &SamplerConfig {
                max_samples: 32,
                seed: 1,
            },
        );
        let b = sample_indices(
            10_000,
            &SamplerConfig {
                max_samples: 32,
                seed: 2,
            },
        );
        assert_ne!(a, b);
    }
}
