//! Semantic pattern tags assigned to source columns.
//!
//! `DataPattern` is a closed enumeration: adding a pattern means adding a
//! variant here and teaching the detector about it, never comparing ad hoc
//! strings at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A recognized semantic type for a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataPattern {
    NameFirst,
    NameLast,
    NameFull,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    /// National Provider Identifier (10-digit provider ID).
    Npi,
    /// DEA registration number.
    Dea,
    Ssn,
    /// Medical record number.
    Mrn,
    EmployeeId,
    InsuranceId,
    DateOfBirth,
    Date,
    DateTime,
    Gender,
    Department,
    Specialty,
    RoomNumber,
    BedNumber,
    Flag,
    FreeTextShort,
    FreeTextLong,
    Unknown,
}

/// Coarse grouping of patterns, used for the source signature histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Name,
    Contact,
    Identifier,
    Temporal,
    Code,
    FreeText,
    Unknown,
}

impl PatternCategory {
    /// Number of categories; fixes the histogram width of signature vectors.
    pub const COUNT: usize = 7;

    /// Stable histogram slot for this category.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Contact => 1,
            Self::Identifier => 2,
            Self::Temporal => 3,
            Self::Code => 4,
            Self::FreeText => 5,
            Self::Unknown => 6,
        }
    }
}

impl DataPattern {
    /// Every recognized pattern, in declaration order.
    pub const ALL: [Self; 27] = [
        Self::NameFirst,
        Self::NameLast,
        Self::NameFull,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::Npi,
        Self::Dea,
        Self::Ssn,
        Self::Mrn,
        Self::EmployeeId,
        Self::InsuranceId,
        Self::DateOfBirth,
        Self::Date,
        Self::DateTime,
        Self::Gender,
        Self::Department,
        Self::Specialty,
        Self::RoomNumber,
        Self::BedNumber,
        Self::Flag,
        Self::FreeTextShort,
        Self::FreeTextLong,
        Self::Unknown,
    ];

    /// The serialized tag for this pattern (used for deterministic
    /// lexical tie-breaking).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameFirst => "NAME_FIRST",
            Self::NameLast => "NAME_LAST",
            Self::NameFull => "NAME_FULL",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Address => "ADDRESS",
            Self::City => "CITY",
            Self::State => "STATE",
            Self::ZipCode => "ZIP_CODE",
            Self::Npi => "NPI",
            Self::Dea => "DEA",
            Self::Ssn => "SSN",
            Self::Mrn => "MRN",
            Self::EmployeeId => "EMPLOYEE_ID",
            Self::InsuranceId => "INSURANCE_ID",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::Date => "DATE",
            Self::DateTime => "DATE_TIME",
            Self::Gender => "GENDER",
            Self::Department => "DEPARTMENT",
            Self::Specialty => "SPECIALTY",
            Self::RoomNumber => "ROOM_NUMBER",
            Self::BedNumber => "BED_NUMBER",
            Self::Flag => "FLAG",
            Self::FreeTextShort => "FREE_TEXT_SHORT",
            Self::FreeTextLong => "FREE_TEXT_LONG",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn category(self) -> PatternCategory {
        match self {
            Self::NameFirst | Self::NameLast | Self::NameFull => PatternCategory::Name,
            Self::Email | Self::Phone | Self::Address | Self::City | Self::State
            | Self::ZipCode => PatternCategory::Contact,
            Self::Npi | Self::Dea | Self::Ssn | Self::Mrn | Self::EmployeeId
            | Self::InsuranceId => PatternCategory::Identifier,
            Self::DateOfBirth | Self::Date | Self::DateTime => PatternCategory::Temporal,
            Self::Gender | Self::Department | Self::Specialty | Self::RoomNumber
            | Self::BedNumber | Self::Flag => PatternCategory::Code,
            Self::FreeTextShort | Self::FreeTextLong => PatternCategory::FreeText,
            Self::Unknown => PatternCategory::Unknown,
        }
    }
}

impl fmt::Display for DataPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pattern match with its confidence, as produced by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: DataPattern,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_tag_once() {
        let mut tags: Vec<&str> = DataPattern::ALL.iter().map(|p| p.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), DataPattern::ALL.len());
    }

    #[test]
    fn serde_uses_screaming_snake_tags() {
        let json = serde_json::to_string(&DataPattern::NameFirst).expect("serialize");
        assert_eq!(json, "\"NAME_FIRST\"");
        let back: DataPattern = serde_json::from_str("\"NPI\"").expect("deserialize");
        assert_eq!(back, DataPattern::Npi);
    }

    #[test]
    fn category_indices_stay_in_histogram_range() {
        for pattern in DataPattern::ALL {
            assert!(pattern.category().index() < PatternCategory::COUNT);
        }
    }
}
