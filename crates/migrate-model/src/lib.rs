pub mod dna;
pub mod error;
pub mod history;
pub mod mapping;
pub mod pattern;
pub mod schema;
pub mod source;

pub use dna::{ColumnDna, DnaId, InferredType, SIGNATURE_LEN, SourceDna};
pub use error::ModelError;
pub use history::{CorpusEntry, HistoricalMigrationRecord, MappingOutcome};
pub use mapping::{
    AlternativeMapping, ConfirmedMapping, MappingSuggestion, NO_MATCH_REASON, ReviewPayload,
    SimilarMigration,
};
pub use pattern::{DataPattern, DetectedPattern, PatternCategory};
pub use schema::{TargetField, TargetRef, TargetSchema, UNMAPPED};
pub use source::{RawSource, normalize_name};
