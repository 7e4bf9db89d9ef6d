//! Currency policy update operation: replace a registered currency's policy.

use serde::{Deserialize, Serialize};

use coinage_currency::CurrencyPolicy;
use coinage_types::{CurrencyId, Hash, Token};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// Intent to replace the policy of an already-registered currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicyUpdaterFact {
    token: Token,
    pub currency: CurrencyId,
    pub policy: CurrencyPolicy,
    hash: Hash,
}

impl CurrencyPolicyUpdaterFact {
    pub fn new(token: Token, currency: CurrencyId, policy: CurrencyPolicy) -> Self {
        let mut fact = Self {
            token,
            currency,
            policy,
            hash: Hash::ZERO,
        };
        fact.hash = fact.compute_hash();
        fact
    }
}

impl Fact for CurrencyPolicyUpdaterFact {
    fn kind(&self) -> OpKind {
        OpKind::CurrencyPolicyUpdater
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut b = self.token.as_bytes().to_vec();
        b.extend_from_slice(self.currency.as_bytes());
        b.extend_from_slice(&self.policy.to_bytes());
        b
    }

    fn is_valid(&self) -> Result<(), OperationError> {
        if self.compute_hash() != self.hash {
            return Err(OperationError::FactHashMismatch);
        }
        self.token.is_valid()?;
        self.currency.is_valid()?;
        self.policy.is_valid()?;
        Ok(())
    }
}
