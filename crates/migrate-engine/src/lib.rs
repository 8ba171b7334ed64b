//! Mapping suggestion scoring, human review sessions, and the feedback
//! loop that grows the historical corpus.

pub mod affinity;
pub mod error;
pub mod feedback;
pub mod session;
pub mod suggest;

pub use affinity::{
    AffinityTable, TargetAffinity, default_affinity_table, default_target_schema,
    load_target_schema,
};
pub use error::EngineError;
pub use feedback::FeedbackLoop;
pub use session::{MigrationSession, SessionState};
pub use suggest::{MappingSuggester, SignalWeights, SuggesterConfig, combine_signals};
