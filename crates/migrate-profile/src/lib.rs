pub mod detector;
pub mod error;
pub mod extractor;
pub mod profiler;

pub use detector::{Detection, DetectorConfig, MatchEvidence, PatternMatch, detect};
pub use error::ProfileError;
pub use extractor::{SourceDnaExtractor, signature_vector, structure_hash};
pub use profiler::{ColumnProfile, SamplerConfig, profile_column};
