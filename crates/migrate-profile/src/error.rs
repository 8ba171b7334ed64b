use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    /// Total absence of input is the only hard profiling failure.
    #[error("source has no columns to profile")]
    EmptySource,
}
