//! Weighted signature-threshold verification.

use std::collections::HashSet;

use thiserror::Error;

use coinage_currency::AccountKeys;
use coinage_types::PublicKey;

use crate::fact::FactSignature;

/// A table of signer weights with a required threshold.
///
/// Implemented by account key sets (account operations) and by suffrage
/// snapshots (node operations).
pub trait SignerWeights {
    /// The signer's weight, or `None` if it is not in the table.
    fn signer_weight(&self, signer: &PublicKey) -> Option<u64>;
    /// The weight the distinct signers must reach together.
    fn required_threshold(&self) -> u64;
}

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("unknown signer: {0}")]
    UnknownSigner(String),

    #[error("signatures did not reach threshold: {collected} < {required}")]
    NotMet { collected: u64, required: u64 },
}

/// Check that the distinct signers of `signs` together reach the table's
/// threshold.
///
/// Any signer missing from the table fails the check outright. Duplicate
/// signers count once, so the result is independent of signature order and
/// repetition.
pub fn check_signs_threshold(
    signs: &[FactSignature],
    table: &impl SignerWeights,
) -> Result<(), ThresholdError> {
    let mut seen: HashSet<&PublicKey> = HashSet::with_capacity(signs.len());
    let mut collected = 0u64;
    for sign in signs {
        if !seen.insert(&sign.signer) {
            continue;
        }
        match table.signer_weight(&sign.signer) {
            Some(weight) => collected += weight,
            None => return Err(ThresholdError::UnknownSigner(sign.signer.to_string())),
        }
    }
    let required = table.required_threshold();
    if collected < required {
        return Err(ThresholdError::NotMet {
            collected,
            required,
        });
    }
    Ok(())
}

impl SignerWeights for AccountKeys {
    fn signer_weight(&self, signer: &PublicKey) -> Option<u64> {
        self.weight_of(signer).map(u64::from)
    }

    fn required_threshold(&self) -> u64 {
        u64::from(self.threshold())
    }
}
