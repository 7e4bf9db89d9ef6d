//! Validation error type shared across crates.

use thiserror::Error;

/// Error raised when a value fails construction or post-decode validation.
///
/// Every variant names the field or value that was rejected, so callers can
/// surface the exact offender without re-deriving it.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid big integer string: {0:?}")]
    InvalidBig(String),

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be over zero")]
    NotOverZero { field: &'static str },

    #[error("invalid currency id {0:?}: expected 3-10 chars, uppercase alphanumeric, letter first")]
    InvalidCurrencyId(String),

    #[error("invalid address {0:?}: {1}")]
    InvalidAddress(String, &'static str),

    #[error("token must not be empty")]
    EmptyToken,

    #[error("token exceeds {max} bytes: {len}")]
    TokenTooLong { len: usize, max: usize },

    #[error("invalid hex key string: {0:?}")]
    InvalidKey(String),

    #[error("network id must not be empty")]
    EmptyNetworkId,

    #[error("{0}")]
    Other(String),
}
