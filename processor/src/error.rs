//! The two failure levels of a processing pass.
//!
//! A [`Rejection`] excludes one operation from the block and lets the pass
//! continue; a [`PassFault`] aborts the whole pass, and `retry_pass()` tells
//! the host whether retrying the pass can help.

use thiserror::Error;

use coinage_operations::{OpKind, ThresholdError};
use coinage_types::Big;

use crate::state::{StateError, StateValue};

/// Non-fatal: the ledger state does not satisfy one operation's
/// preconditions. The operation is dropped, the pass goes on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown signer: {0}")]
    UnknownSigner(String),

    #[error("signatures did not reach threshold: {collected} < {required}")]
    ThresholdNotMet { collected: u64, required: u64 },

    #[error("currency design already exists: {0}")]
    CurrencyAlreadyRegistered(String),

    #[error("currency not registered: {0}")]
    CurrencyNotFound(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("contract account not allowed here: {0}")]
    ContractAccountDisallowed(String),

    #[error("{0} is not a contract account")]
    ContractAccountRequired(String),

    #[error("contract account {target} is not owned by {sender}")]
    NotOwner { target: String, sender: String },

    #[error("balance already exists: {address} in {currency}")]
    BalanceAlreadyExists { address: String, currency: String },

    #[error("insufficient balance of {address} in {currency}: required {required}, available {available}")]
    InsufficientBalance {
        address: String,
        currency: String,
        required: Big,
        available: Big,
    },

    #[error("initial balance {amount} in {currency} is under the minimum {min}")]
    UnderMinBalance {
        currency: String,
        min: Big,
        amount: Big,
    },
}

impl From<ThresholdError> for Rejection {
    fn from(e: ThresholdError) -> Self {
        match e {
            ThresholdError::UnknownSigner(signer) => Self::UnknownSigner(signer),
            ThresholdError::NotMet {
                collected,
                required,
            } => Self::ThresholdNotMet {
                collected,
                required,
            },
        }
    }
}

/// Fatal: the pass cannot produce a correct result and must be aborted.
#[derive(Debug, Error)]
pub enum PassFault {
    /// Suffrage state is absent or empty. The only retryable fault: the
    /// host should retry the whole pass once the state is available.
    #[error("suffrage state is empty")]
    EmptySuffrage,

    #[error(transparent)]
    State(#[from] StateError),

    #[error("corrupt state at {key}: expected {expected}, found {found}")]
    CorruptState {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("processor for {expected} was handed a {got} operation")]
    KindMismatch { expected: OpKind, got: OpKind },

    #[error("no processor registered for {0}")]
    UnknownKind(OpKind),
}

impl PassFault {
    pub fn corrupt(key: String, expected: &'static str, found: &StateValue) -> Self {
        Self::CorruptState {
            key,
            expected,
            found: found.type_name(),
        }
    }

    /// Whether the host should retry the pass instead of abandoning it.
    pub fn retry_pass(&self) -> bool {
        matches!(self, Self::EmptySuffrage)
    }
}

/// Internal error carrier letting processor bodies use `?` for both levels.
/// Split back into the public two-level shape at the trait boundary.
#[derive(Debug)]
pub(crate) enum ProcError {
    Reject(Rejection),
    Fault(PassFault),
}

impl From<Rejection> for ProcError {
    fn from(r: Rejection) -> Self {
        Self::Reject(r)
    }
}

impl From<ThresholdError> for ProcError {
    fn from(e: ThresholdError) -> Self {
        Self::Reject(e.into())
    }
}

impl From<PassFault> for ProcError {
    fn from(f: PassFault) -> Self {
        Self::Fault(f)
    }
}

impl From<StateError> for ProcError {
    fn from(e: StateError) -> Self {
        Self::Fault(e.into())
    }
}

/// Fold a `ProcError` result into the outcome shape of the processor trait.
pub(crate) fn outcome<T>(
    r: Result<T, ProcError>,
) -> Result<Result<T, Rejection>, PassFault> {
    match r {
        Ok(v) => Ok(Ok(v)),
        Err(ProcError::Reject(rej)) => Ok(Err(rej)),
        Err(ProcError::Fault(fault)) => Err(fault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_suffrage_retries() {
        assert!(PassFault::EmptySuffrage.retry_pass());
        assert!(!PassFault::UnknownKind(OpKind::Transfer).retry_pass());
        assert!(!PassFault::State(StateError::Backend("down".into())).retry_pass());
    }

    #[test]
    fn threshold_error_maps_to_rejection() {
        let r: Rejection = ThresholdError::NotMet {
            collected: 2,
            required: 3,
        }
        .into();
        assert_eq!(
            r,
            Rejection::ThresholdNotMet {
                collected: 2,
                required: 3
            }
        );
    }

    #[test]
    fn outcome_splits_levels() {
        assert!(matches!(outcome::<()>(Ok(())), Ok(Ok(()))));
        let rejected = outcome::<()>(Err(Rejection::CurrencyNotFound("PEN".into()).into()));
        assert!(matches!(rejected, Ok(Err(Rejection::CurrencyNotFound(_)))));
        let faulted = outcome::<()>(Err(PassFault::EmptySuffrage.into()));
        assert!(matches!(faulted, Err(PassFault::EmptySuffrage)));
    }
}
