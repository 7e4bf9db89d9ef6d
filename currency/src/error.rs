use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("invalid key weight {0}: must be 1..=100")]
    InvalidWeight(u8),

    #[error("invalid threshold {0}: must be 1..=100")]
    InvalidThreshold(u8),

    #[error("key set must not be empty")]
    EmptyKeys,

    #[error("duplicate key in key set: {0}")]
    DuplicateKey(String),

    #[error("keys are not in canonical order")]
    KeysNotSorted,

    #[error("key set hash does not match its contents")]
    KeysHashMismatch,

    #[error("invalid fee ratio {0}: must be at most 10000 basis points")]
    InvalidRatio(u32),

    #[error("fee maximum is below fee minimum")]
    MaxBelowMin,

    #[error("validation error: {0}")]
    Validation(#[from] coinage_types::ValidationError),
}
