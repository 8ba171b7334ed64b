use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the suggestion engine and session lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    #[error("confirmed column '{0}' does not exist in the profiled source")]
    UnknownColumn(String),

    #[error(transparent)]
    Corpus(#[from] anyhow::Error),
}
