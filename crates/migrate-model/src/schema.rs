//! Target schema description: the fixed destination the engine maps into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used when no candidate clears the confidence floor.
pub const UNMAPPED: &str = "UNMAPPED";

/// Identity of one destination field.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TargetRef {
    pub table: String,
    pub column: String,
}

impl TargetRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The `(UNMAPPED, UNMAPPED)` sentinel pair.
    #[must_use]
    pub fn unmapped() -> Self {
        Self::new(UNMAPPED, UNMAPPED)
    }

    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        self.table == UNMAPPED && self.column == UNMAPPED
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One candidate destination field, with naming synonyms used for
/// name-similarity scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetField {
    pub table: String,
    pub column: String,
    /// Alternative names this field is known by in source exports.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl TargetField {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            synonyms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn target_ref(&self) -> TargetRef {
        TargetRef::new(self.table.clone(), self.column.clone())
    }
}

/// The full set of candidate destination fields for one tenant/schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSchema {
    pub name: String,
    pub fields: Vec<TargetField>,
}

impl TargetSchema {
    pub fn new(name: impl Into<String>, fields: Vec<TargetField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, table: &str, column: &str) -> Option<&TargetField> {
        self.fields
            .iter()
            .find(|f| f.table == table && f.column == column)
    }
}
