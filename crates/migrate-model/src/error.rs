use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid dna id: {0:?}")]
    InvalidDnaId(String),
    #[error("signature vector must have {expected} dimensions, got {actual}")]
    SignatureLength { expected: usize, actual: usize },
}
