//! Migration session lifecycle.
//!
//! A session moves strictly forward: Profiled -> Suggested -> UnderReview,
//! then either Confirmed or Abandoned. The corpus is written exactly once,
//! on the transition into Confirmed; an abandoned session leaves no trace
//! in history.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use migrate_model::{ConfirmedMapping, HistoricalMigrationRecord, ReviewPayload, SourceDna};

use migrate_index::{CorpusStore, SimilarityIndex};

use crate::error::EngineError;
use crate::feedback::FeedbackLoop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Profiled,
    Suggested,
    UnderReview,
    Confirmed,
    Abandoned,
}

impl SessionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profiled => "PROFILED",
            Self::Suggested => "SUGGESTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Confirmed => "CONFIRMED",
            Self::Abandoned => "ABANDONED",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Abandoned)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One migration from profiling through review to its terminal state.
#[derive(Debug)]
pub struct MigrationSession {
    dna: SourceDna,
    state: SessionState,
    payload: Option<ReviewPayload>,
}

impl MigrationSession {
    /// Starts a session for an already-profiled source.
    #[must_use]
    pub fn new(dna: SourceDna) -> Self {
        Self {
            dna,
            state: SessionState::Profiled,
            payload: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn dna(&self) -> &SourceDna {
        &self.dna
    }

    /// Suggestions attached after scoring; `None` before that transition.
    #[must_use]
    pub fn payload(&self) -> Option<&ReviewPayload> {
        self.payload.as_ref()
    }

    /// Profiled -> Suggested.
    pub fn attach_suggestions(&mut self, payload: ReviewPayload) -> Result<(), EngineError> {
        self.transition(SessionState::Profiled, SessionState::Suggested)?;
        self.payload = Some(payload);
        Ok(())
    }

    /// Suggested -> UnderReview.
    pub fn begin_review(&mut self) -> Result<(), EngineError> {
        self.transition(SessionState::Suggested, SessionState::UnderReview)
    }

    /// UnderReview -> Confirmed. The only path that writes the corpus.
    pub fn confirm<S: CorpusStore>(
        &mut self,
        confirmed: &[ConfirmedMapping],
        index: &SimilarityIndex<S>,
    ) -> Result<HistoricalMigrationRecord, EngineError> {
        if self.state != SessionState::UnderReview {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: SessionState::Confirmed,
            });
        }
        let suggestions = self
            .payload
            .as_ref()
            .map(|p| p.suggestions.as_slice())
            .unwrap_or_default();
        let record = FeedbackLoop::new().record(&self.dna, suggestions, confirmed, index)?;
        self.state = SessionState::Confirmed;
        info!(dna_id = %record.dna_id, "session confirmed");
        Ok(record)
    }

    /// Any non-terminal state -> Abandoned. Writes nothing.
    pub fn abandon(&mut self) -> Result<(), EngineError> {
        if self.state.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: SessionState::Abandoned,
            });
        }
        self.state = SessionState::Abandoned;
        Ok(())
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> Result<(), EngineError> {
        if self.state != from {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_stable() {
        assert_eq!(SessionState::UnderReview.as_str(), "UNDER_REVIEW");
        assert_eq!(SessionState::UnderReview.to_string(), "UNDER_REVIEW");
    }

    #[test]
    fn terminal_states() {
        assert!(SessionState::Confirmed.is_terminal());
        assert!(SessionState::Abandoned.is_terminal());
        assert!(!SessionState::Profiled.is_terminal());
        assert!(!SessionState::UnderReview.is_terminal());
    }
}
