//! Static pattern-to-field affinity table and the built-in target schema.
//!
//! Both are serde documents so tenants can ship their own; the compiled-in
//! defaults cover the application's `hc_*` operations schema. They are
//! injected into the suggester explicitly, never as module-level singletons.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use migrate_model::{DataPattern, TargetField, TargetRef, TargetSchema};

/// One destination a pattern predicts, with its prior strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetAffinity {
    pub target: TargetRef,
    /// Prior strength in [0, 1].
    pub weight: f32,
}

/// How strongly each pattern predicts specific destination fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffinityTable {
    entries: BTreeMap<DataPattern, Vec<TargetAffinity>>,
}

impl AffinityTable {
    #[must_use]
    pub fn new(entries: BTreeMap<DataPattern, Vec<TargetAffinity>>) -> Self {
        Self { entries }
    }

    /// Prior strength of `pattern` predicting `target`; 0 when unlisted.
    #[must_use]
    pub fn affinity(&self, pattern: DataPattern, target: &TargetRef) -> f32 {
        self.entries
            .get(&pattern)
            .and_then(|targets| targets.iter().find(|t| &t.target == target))
            .map_or(0.0, |t| t.weight)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read affinity table: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parse affinity table: {}", path.display()))
    }
}

/// Loads a tenant target schema document.
pub fn load_target_schema(path: &Path) -> Result<TargetSchema> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read target schema: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse target schema: {}", path.display()))
}

/// The built-in healthcare operations destination schema.
#[must_use]
pub fn default_target_schema() -> TargetSchema {
    TargetSchema::new(
        "hc_operations",
        vec![
            TargetField::new("hc_staff", "first_name").with_synonyms(&["fname", "given_name"]),
            TargetField::new("hc_staff", "last_name").with_synonyms(&["lname", "surname"]),
            TargetField::new("hc_staff", "email")
                .with_synonyms(&["work_email", "emp_email", "email_address"]),
            TargetField::new("hc_staff", "phone").with_synonyms(&["work_phone", "telephone"]),
            TargetField::new("hc_staff", "npi").with_synonyms(&["npi_number", "provider_id"]),
            TargetField::new("hc_staff", "dea_number").with_synonyms(&["dea"]),
            TargetField::new("hc_staff", "employee_id")
                .with_synonyms(&["emp_id", "staff_id", "badge_number"]),
            TargetField::new("hc_staff", "department").with_synonyms(&["dept", "unit"]),
            TargetField::new("hc_staff", "specialty").with_synonyms(&["taxonomy"]),
            TargetField::new("hc_staff", "hire_date").with_synonyms(&["start_date"]),
            TargetField::new("hc_patients", "first_name").with_synonyms(&["given_name"]),
            TargetField::new("hc_patients", "last_name").with_synonyms(&["surname"]),
            TargetField::new("hc_patients", "date_of_birth")
                .with_synonyms(&["dob", "birth_date"]),
            TargetField::new("hc_patients", "gender").with_synonyms(&["sex"]),
            TargetField::new("hc_patients", "mrn")
                .with_synonyms(&["medical_record_number", "chart_number"]),
            TargetField::new("hc_patients", "ssn").with_synonyms(&["social_security_number"]),
            TargetField::new("hc_patients", "email").with_synonyms(&["patient_email"]),
            TargetField::new("hc_patients", "phone").with_synonyms(&["home_phone", "mobile"]),
            TargetField::new("hc_patients", "address_line1")
                .with_synonyms(&["address", "street"]),
            TargetField::new("hc_patients", "city"),
            TargetField::new("hc_patients", "state"),
            TargetField::new("hc_patients", "zip_code").with_synonyms(&["zip", "postal_code"]),
            TargetField::new("hc_patients", "insurance_member_id")
                .with_synonyms(&["member_id", "insurance_id", "policy_number"]),
            TargetField::new("hc_beds", "room_number").with_synonyms(&["room", "room_no"]),
            TargetField::new("hc_beds", "bed_number").with_synonyms(&["bed", "bed_no"]),
            TargetField::new("hc_beds", "unit").with_synonyms(&["ward", "floor"]),
            TargetField::new("hc_admissions", "admit_date")
                .with_synonyms(&["admission_date", "admitted"]),
            TargetField::new("hc_admissions", "discharge_date").with_synonyms(&["discharged"]),
            TargetField::new("hc_admissions", "notes")
                .with_synonyms(&["comments", "description", "narrative"]),
        ],
    )
}

/// Default priors for the built-in schema.
///
/// Staff-table fields rank slightly above their patient-table twins so a
/// bare ambiguous column resolves deterministically; tenant tables override
/// this by supplying their own document.
#[must_use]
pub fn default_affinity_table() -> AffinityTable {
    let mut entries: BTreeMap<DataPattern, Vec<TargetAffinity>> = BTreeMap::new();
    let mut add = |pattern: DataPattern, table: &str, column: &str, weight: f32| {
        entries.entry(pattern).or_default().push(TargetAffinity {
            target: TargetRef::new(table, column),
            weight,
        });
    };

    add(DataPattern::NameFirst, "hc_staff", "first_name", 1.0);
    add(DataPattern::NameFirst, "hc_patients", "first_name", 0.95);
    add(DataPattern::NameLast, "hc_staff", "last_name", 1.0);
    add(DataPattern::NameLast, "hc_patients", "last_name", 0.95);
    add(DataPattern::Email, "hc_staff", "email", 1.0);
    add(DataPattern::Email, "hc_patients", "email", 0.9);
    add(DataPattern::Phone, "hc_staff", "phone", 1.0);
    add(DataPattern::Phone, "hc_patients", "phone", 0.9);
    add(DataPattern::Address, "hc_patients", "address_line1", 1.0);
    add(DataPattern::City, "hc_patients", "city", 1.0);
    add(DataPattern::State, "hc_patients", "state", 1.0);
    add(DataPattern::ZipCode, "hc_patients", "zip_code", 1.0);
    add(DataPattern::Npi, "hc_staff", "npi", 1.0);
    add(DataPattern::Dea, "hc_staff", "dea_number", 1.0);
    add(DataPattern::Ssn, "hc_patients", "ssn", 1.0);
    add(DataPattern::Mrn, "hc_patients", "mrn", 1.0);
    add(DataPattern::EmployeeId, "hc_staff", "employee_id", 1.0);
    add(DataPattern::InsuranceId, "hc_patients", "insurance_member_id", 1.0);
    add(DataPattern::DateOfBirth, "hc_patients", "date_of_birth", 1.0);
    add(DataPattern::Date, "hc_admissions", "admit_date", 0.6);
    add(DataPattern::Date, "hc_admissions", "discharge_date", 0.6);
    add(DataPattern::Date, "hc_staff", "hire_date", 0.5);
    add(DataPattern::DateTime, "hc_admissions", "admit_date", 0.5);
    add(DataPattern::DateTime, "hc_admissions", "discharge_date", 0.5);
    add(DataPattern::Gender, "hc_patients", "gender", 1.0);
    add(DataPattern::Department, "hc_staff", "department", 0.9);
    add(DataPattern::Department, "hc_beds", "unit", 0.7);
    add(DataPattern::Specialty, "hc_staff", "specialty", 1.0);
    add(DataPattern::RoomNumber, "hc_beds", "room_number", 1.0);
    add(DataPattern::BedNumber, "hc_beds", "bed_number", 1.0);
    add(DataPattern::FreeTextShort, "hc_admissions", "notes", 0.5);
    add(DataPattern::FreeTextLong, "hc_admissions", "notes", 0.5);

    AffinityTable::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affinity_lookup_hits_and_misses() {
        let table = default_affinity_table();
        let npi = TargetRef::new("hc_staff", "npi");
        assert_eq!(table.affinity(DataPattern::Npi, &npi), 1.0);
        assert_eq!(table.affinity(DataPattern::Email, &npi), 0.0);
        assert_eq!(table.affinity(DataPattern::Unknown, &npi), 0.0);
    }

    #[test]
    fn default_affinity_targets_exist_in_default_schema() {
        let schema = default_target_schema();
        let table = default_affinity_table();
        let json = serde_json::to_value(&table).expect("serialize table");
        for (_, targets) in json["entries"].as_object().expect("entries map") {
            for target in targets.as_array().expect("target list") {
                let table_name = target["target"]["table"].as_str().unwrap();
                let column = target["target"]["column"].as_str().unwrap();
                assert!(
                    schema.field(table_name, column).is_some(),
                    "{table_name}.{column} missing from schema"
                );
            }
        }
    }

    #[test]
    fn affinity_table_round_trips_through_json() {
        let table = default_affinity_table();
        let json = serde_json::to_string(&table).expect("serialize");
        let back: AffinityTable = serde_json::from_str(&json).expect("deserialize");
        let target = TargetRef::new("hc_patients", "mrn");
        assert_eq!(back.affinity(DataPattern::Mrn, &target), 1.0);
    }
}
