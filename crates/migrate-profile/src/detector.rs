//! Semantic pattern detection for a single column.
//!
//! Two independent matcher families propose `(pattern, confidence)` pairs:
//! name-token matching against per-pattern synonym lists, and value-shape
//! matching (regex, charset, lexicon heuristics) over the sampled values.
//! The same pattern proposed by both takes the maximum, never the sum.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use migrate_model::{DataPattern, DetectedPattern, InferredType, normalize_name};

use crate::profiler::{ColumnProfile, is_boolean_token, is_date_shaped};

/// Detection thresholds. Injected, never global.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Matches below this floor are dropped entirely.
    pub min_confidence: f32,
    /// Confidence assigned to the `Unknown` fallback when nothing matched.
    pub fallback_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.15,
            fallback_confidence: 0.2,
        }
    }
}

/// Which matcher family produced a match. Value evidence outranks naming
/// convention when confidences tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEvidence {
    ValueShape,
    NameToken,
}

/// One pattern proposal with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub pattern: DataPattern,
    pub confidence: f32,
    pub evidence: MatchEvidence,
}

/// The detector's verdict for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Ranked matches above the floor; may be empty.
    pub matches: Vec<PatternMatch>,
    pub primary: DataPattern,
    pub confidence: f32,
    /// Sample values excluded from evidence as malformed.
    pub malformed_count: usize,
}

impl Detection {
    #[must_use]
    pub fn detected_patterns(&self) -> Vec<DetectedPattern> {
        self.matches
            .iter()
            .map(|m| DetectedPattern {
                pattern: m.pattern,
                confidence: m.confidence,
            })
            .collect()
    }
}

/// Classifies one column from its name, sampled values, and profile.
pub fn detect(
    original_name: &str,
    profile: &ColumnProfile,
    config: &DetectorConfig,
) -> Detection {
    let normalized = normalize_name(original_name);

    let (clean, malformed_count) = partition_malformed(&profile.sampled_values);
    if malformed_count > 0 {
        debug!(
            column = original_name,
            excluded = malformed_count,
            "excluded malformed sample values from pattern evidence"
        );
    }

    let mut best: BTreeMap<DataPattern, PatternMatch> = BTreeMap::new();
    let mut propose = |pattern: DataPattern, confidence: f32, evidence: MatchEvidence| {
        if confidence <= 0.0 {
            return;
        }
        let confidence = confidence.min(1.0);
        match best.get(&pattern) {
            // Correlated signals must not inflate certainty: keep the max.
            Some(existing)
                if existing.confidence > confidence
                    || (existing.confidence == confidence
                        && existing.evidence == MatchEvidence::ValueShape) => {}
            _ => {
                best.insert(
                    pattern,
                    PatternMatch {
                        pattern,
                        confidence,
                        evidence,
                    },
                );
            }
        }
    };

    for pattern in DataPattern::ALL {
        let name_score = name_token_score(&normalized, pattern);
        if name_score > 0.0 {
            propose(pattern, name_score, MatchEvidence::NameToken);
        }
    }
    if !clean.is_empty() {
        for (pattern, score) in value_shape_scores(&clean, profile) {
            propose(pattern, score, MatchEvidence::ValueShape);
        }
    }

    let mut matches: Vec<PatternMatch> = best
        .into_values()
        .filter(|m| m.confidence >= config.min_confidence)
        .collect();
    matches.sort_by(compare_matches);

    let (primary, confidence) = match matches.first() {
        Some(top) => (top.pattern, top.confidence),
        None => (DataPattern::Unknown, config.fallback_confidence.min(0.3)),
    };

    Detection {
        matches,
        primary,
        confidence,
        malformed_count,
    }
}

/// Confidence descending, then value evidence before name evidence, then
/// lexical pattern tag for full determinism.
fn compare_matches(a: &PatternMatch, b: &PatternMatch) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| evidence_rank(a.evidence).cmp(&evidence_rank(b.evidence)))
        .then_with(|| a.pattern.as_str().cmp(b.pattern.as_str()))
}

fn evidence_rank(evidence: MatchEvidence) -> u8 {
    match evidence {
        MatchEvidence::ValueShape => 0,
        MatchEvidence::NameToken => 1,
    }
}

fn partition_malformed(values: &[String]) -> (Vec<&str>, usize) {
    let mut clean = Vec::with_capacity(values.len());
    let mut malformed = 0usize;
    for value in values {
        if value
            .chars()
            .any(|ch| (ch.is_control() && ch != '\t') || ch == '\u{FFFD}')
        {
            malformed += 1;
        } else {
            clean.push(value.as_str());
        }
    }
    (clean, malformed)
}

const EXACT_NAME_CONFIDENCE: f32 = 0.92;
const PARTIAL_NAME_CONFIDENCE: f32 = 0.72;

fn name_token_score(normalized: &str, pattern: DataPattern) -> f32 {
    let mut best = 0.0f32;
    for synonym in name_synonyms(pattern) {
        if normalized == *synonym {
            return EXACT_NAME_CONFIDENCE;
        }
        if contains_phrase(normalized, synonym) {
            best = best.max(PARTIAL_NAME_CONFIDENCE);
        }
    }
    best
}

/// Whole-word containment: "emp email" contains "email", but "state"
/// does not match inside "statement".
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let padded = format!(" {haystack} ");
    padded.contains(&format!(" {phrase} "))
}

fn name_synonyms(pattern: DataPattern) -> &'static [&'static str] {
    match pattern {
        DataPattern::NameFirst => &["first name", "firstname", "fname", "given name", "first"],
        DataPattern::NameLast => &[
            "last name",
            "lastname",
            "lname",
            "surname",
            "family name",
            "last",
        ],
        DataPattern::NameFull => &[
            "full name",
            "name",
            "patient name",
            "provider name",
            "staff name",
            "display name",
        ],
        DataPattern::Email => &["email", "e mail", "email address", "mail"],
        DataPattern::Phone => &[
            "phone",
            "phone number",
            "telephone",
            "tel",
            "mobile",
            "cell",
            "fax",
        ],
        DataPattern::Address => &["address", "street", "address line 1", "addr"],
        DataPattern::City => &["city", "town"],
        DataPattern::State => &["state", "province"],
        DataPattern::ZipCode => &["zip", "zip code", "postal code", "postcode"],
        DataPattern::Npi => &[
            "npi",
            "npi number",
            "provider id",
            "national provider identifier",
        ],
        DataPattern::Dea => &["dea", "dea number", "dea registration"],
        DataPattern::Ssn => &["ssn", "social security", "social security number"],
        DataPattern::Mrn => &[
            "mrn",
            "medical record number",
            "record number",
            "chart number",
        ],
        DataPattern::EmployeeId => &[
            "employee id",
            "emp id",
            "staff id",
            "badge number",
            "employee number",
        ],
        DataPattern::InsuranceId => &[
            "insurance id",
            "member id",
            "policy number",
            "insurance member id",
            "payer id",
        ],
        DataPattern::DateOfBirth => &["date of birth", "dob", "birth date", "birthdate"],
        DataPattern::Date => &[
            "date",
            "admit date",
            "discharge date",
            "visit date",
            "service date",
            "hire date",
        ],
        DataPattern::DateTime => &["datetime", "timestamp", "date time", "created at"],
        DataPattern::Gender => &["gender", "sex"],
        DataPattern::Department => &["department", "dept", "unit", "ward"],
        DataPattern::Specialty => &["specialty", "speciality", "taxonomy"],
        DataPattern::RoomNumber => &["room", "room number", "room no"],
        DataPattern::BedNumber => &["bed", "bed number", "bed no"],
        DataPattern::Flag => &["flag", "active", "is active", "enabled"],
        DataPattern::FreeTextShort => &["comment", "note", "remark"],
        DataPattern::FreeTextLong => &["notes", "comments", "description", "narrative"],
        DataPattern::Unknown => &[],
    }
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));
static NPI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[12]\d{9}$").expect("static regex"));
static DEA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}\d{7}$").expect("static regex"));
static SSN_DASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("static regex"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("static regex"));
static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+\S+").expect("static regex"));

/// Every value-shape proposal for the sampled values of one column.
fn value_shape_scores(clean: &[&str], profile: &ColumnProfile) -> Vec<(DataPattern, f32)> {
    let mut scores = Vec::new();
    let total = clean.len() as f32;
    let ratio = |count: usize| count as f32 / total;

    let mut email = 0usize;
    let mut npi = 0usize;
    let mut dea = 0usize;
    let mut ssn_dashed = 0usize;
    let mut zip = 0usize;
    let mut phone = 0usize;
    let mut state = 0usize;
    let mut gender = 0usize;
    let mut first_name = 0usize;
    let mut last_name = 0usize;
    let mut full_name = 0usize;
    let mut address = 0usize;
    let mut date = 0usize;
    let mut datetime = 0usize;
    let mut boolean = 0usize;

    for value in clean {
        if EMAIL_RE.is_match(value) {
            email += 1;
        }
        if NPI_RE.is_match(value) {
            npi += 1;
        }
        if DEA_RE.is_match(value) {
            dea += 1;
        }
        if SSN_DASHED_RE.is_match(value) {
            ssn_dashed += 1;
        }
        if ZIP_RE.is_match(value) {
            zip += 1;
        }
        if is_phone_shaped(value) {
            phone += 1;
        }
        if is_state_code(value) {
            state += 1;
        }
        if is_gender_token(value) {
            gender += 1;
        }
        let lower = value.to_ascii_lowercase();
        if FIRST_NAMES.binary_search(&lower.as_str()).is_ok() {
            first_name += 1;
        }
        if LAST_NAMES.binary_search(&lower.as_str()).is_ok() {
            last_name += 1;
        }
        if is_full_name_shaped(value) {
            full_name += 1;
        }
        if ADDRESS_RE.is_match(value) && value.chars().any(|c| c.is_ascii_alphabetic()) {
            address += 1;
        }
        if is_date_shaped(value) {
            if value.contains(':') {
                datetime += 1;
            } else {
                date += 1;
            }
        }
        if is_boolean_token(value) {
            boolean += 1;
        }
    }

    scores.push((DataPattern::Email, 0.95 * ratio(email)));
    scores.push((DataPattern::Npi, 0.92 * ratio(npi)));
    scores.push((DataPattern::Dea, 0.9 * ratio(dea)));
    scores.push((DataPattern::Ssn, 0.9 * ratio(ssn_dashed)));
    // ZIPs collide with plain 5-digit codes, so cap below the dedicated IDs.
    scores.push((DataPattern::ZipCode, 0.8 * ratio(zip)));
    scores.push((DataPattern::Phone, 0.85 * ratio(phone)));
    scores.push((DataPattern::State, 0.8 * ratio(state)));
    scores.push((DataPattern::Gender, 0.85 * ratio(gender)));
    scores.push((DataPattern::NameFirst, 0.85 * ratio(first_name)));
    scores.push((DataPattern::NameLast, 0.8 * ratio(last_name)));
    scores.push((DataPattern::NameFull, 0.7 * ratio(full_name)));
    scores.push((DataPattern::Address, 0.7 * ratio(address)));
    scores.push((DataPattern::Date, 0.85 * ratio(date)));
    scores.push((DataPattern::DateTime, 0.85 * ratio(datetime)));
    if profile.inferred_type == InferredType::Boolean {
        scores.push((DataPattern::Flag, 0.7 * ratio(boolean)));
    }
    if profile.avg_length > 80.0 {
        scores.push((DataPattern::FreeTextLong, 0.6));
    } else if profile.avg_length > 20.0 && profile.inferred_type == InferredType::String {
        scores.push((DataPattern::FreeTextShort, 0.35));
    }

    scores.retain(|(_, score)| *score > 0.0);
    scores
}

fn is_phone_shaped(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let non_phone = value
        .chars()
        .any(|c| !c.is_ascii_digit() && !matches!(c, ' ' | '-' | '(' | ')' | '+' | '.'));
    (10..=11).contains(&digits) && !non_phone && value.len() > 9
}

fn is_state_code(value: &str) -> bool {
    const STATES: [&str; 51] = [
        "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID", "IL",
        "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE",
        "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
        "VA", "VT", "WA", "WI", "WV", "WY",
    ];
    STATES.binary_search(&value.to_ascii_uppercase().as_str()).is_ok()
}

fn is_gender_token(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "m" | "f" | "male" | "female" | "other" | "unknown" | "u" | "nonbinary" | "non-binary"
    )
}

fn is_full_name_shaped(value: &str) -> bool {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if !(2..=4).contains(&tokens.len()) {
        return false;
    }
    tokens.iter().all(|t| {
        let mut chars = t.chars();
        chars.next().is_some_and(char::is_uppercase)
            && t.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-')
    })
}

// Sorted lowercase lexicons for name value-evidence. Coverage is
// deliberately common-cases-only; the name-token matcher carries the rest.
const FIRST_NAMES: [&str; 80] = [
    "aaron", "adam", "alice", "amanda", "amy", "andrew", "angela", "anna", "anthony", "barbara",
    "benjamin", "betty", "bob", "brandon", "brian", "carol", "charles", "christopher", "daniel",
    "david", "deborah", "dennis", "donald", "donna", "dorothy", "edward", "elizabeth", "emily",
    "emma", "eric", "frank", "gary", "george", "hannah", "helen", "jacob", "james", "jane",
    "jason", "jeffrey", "jennifer", "jessica", "john", "jonathan", "joseph", "joshua", "karen",
    "katherine", "kenneth", "kevin", "kimberly", "larry", "laura", "linda", "lisa", "margaret",
    "maria", "mark", "mary", "matthew", "melissa", "michael", "michelle", "nancy", "nicholas",
    "olivia", "patricia", "paul", "rebecca", "richard", "robert", "ronald", "ruth", "sandra",
    "sarah", "steven", "susan", "thomas", "timothy", "william",
];

const LAST_NAMES: [&str; 60] = [
    "adams", "allen", "anderson", "baker", "brown", "campbell", "carter", "clark", "collins",
    "davis", "edwards", "evans", "flores", "garcia", "gonzalez", "green", "hall", "harris",
    "hernandez", "hill", "jackson", "johnson", "jones", "king", "lee", "lewis", "lopez",
    "martin", "martinez", "miller", "mitchell", "moore", "morris", "murphy", "nelson", "nguyen",
    "parker", "perez", "phillips", "ramirez", "rivera", "roberts", "robinson", "rodriguez",
    "rogers", "sanchez", "scott", "smith", "stewart", "taylor", "thomas", "thompson", "torres",
    "turner", "walker", "white", "williams", "wilson", "wright", "young",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{SamplerConfig, profile_column};

    fn run(name: &str, values: &[&str]) -> Detection {
        let opts: Vec<Option<&str>> = values.iter().map(|v| Some(*v)).collect();
        let profile = profile_column(&opts, &SamplerConfig::default());
        detect(name, &profile, &DetectorConfig::default())
    }

    #[test]
    fn email_values_dominate_even_without_name_hint() {
        let detection = run(
            "contact",
            &["a@clinic.org", "b@clinic.org", "c@hospital.net"],
        );
        assert_eq!(detection.primary, DataPattern::Email);
        assert!(detection.confidence >= 0.9);
    }

    #[test]
    fn first_name_scenario_reaches_high_confidence() {
        let detection = run("first_name", &["John", "Jane", "Bob"]);
        assert_eq!(detection.primary, DataPattern::NameFirst);
        assert!(detection.confidence >= 0.9, "got {}", detection.confidence);
        assert!(detection.matches.iter().any(|m| m.pattern == DataPattern::NameFirst));
    }

    #[test]
    fn npi_shape_wins_over_generic_provider_naming() {
        let detection = run("provider_id", &["1234567893", "1987654321", "2345678901"]);
        assert_eq!(detection.primary, DataPattern::Npi);
        assert!(detection.confidence >= 0.9);
    }

    #[test]
    fn value_evidence_outranks_name_evidence_on_ties() {
        let a = PatternMatch {
            pattern: DataPattern::Email,
            confidence: 0.8,
            evidence: MatchEvidence::NameToken,
        };
        let b = PatternMatch {
            pattern: DataPattern::Phone,
            confidence: 0.8,
            evidence: MatchEvidence::ValueShape,
        };
        assert_eq!(compare_matches(&b, &a), std::cmp::Ordering::Less);
    }

    #[test]
    fn equal_ties_fall_back_to_lexical_tag_order() {
        let a = PatternMatch {
            pattern: DataPattern::Date,
            confidence: 0.5,
            evidence: MatchEvidence::NameToken,
        };
        let b = PatternMatch {
            pattern: DataPattern::Gender,
            confidence: 0.5,
            evidence: MatchEvidence::NameToken,
        };
        // "DATE" < "GENDER"
        assert_eq!(compare_matches(&a, &b), std::cmp::Ordering::Less);
    }

    #[test]
    fn nothing_matching_yields_unknown_fallback_not_null() {
        let detection = run("xq77", &["zz1", "qq2", "kx9"]);
        assert!(detection.matches.is_empty());
        assert_eq!(detection.primary, DataPattern::Unknown);
        assert!(detection.confidence <= 0.3);
    }

    #[test]
    fn malformed_values_are_excluded_not_fatal() {
        let opts = vec![Some("a@b.co"), Some("bad\u{0000}value"), Some("c@d.org")];
        let profile = profile_column(&opts, &SamplerConfig::default());
        let detection = detect("email", &profile, &DetectorConfig::default());
        assert_eq!(detection.malformed_count, 1);
        assert_eq!(detection.primary, DataPattern::Email);
    }

    #[test]
    fn same_pattern_from_both_matchers_takes_max_not_sum() {
        // Name says email (0.92 exact) and values say email (0.95).
        let detection = run("email", &["a@b.co", "c@d.org"]);
        let email = detection
            .matches
            .iter()
            .find(|m| m.pattern == DataPattern::Email)
            .expect("email match");
        assert!(email.confidence <= 0.95 + f32::EPSILON);
        assert_eq!(email.evidence, MatchEvidence::ValueShape);
    }

    #[test]
    fn lexicons_are_sorted_for_binary_search() {
        let mut first = FIRST_NAMES;
        first.sort_unstable();
        assert_eq!(first, FIRST_NAMES);
        let mut last = LAST_NAMES;
        last.sort_unstable();
        assert_eq!(last, LAST_NAMES);
    }
}
