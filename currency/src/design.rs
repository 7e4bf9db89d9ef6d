//! Currency designs and their policies.

use serde::{Deserialize, Serialize};

use coinage_types::{Address, Amount, Big, CurrencyId, ValidationError};

use crate::error::CurrencyError;
use crate::feeer::Feeer;

/// The adjustable part of a currency design, replaced wholesale by the
/// policy-update operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicy {
    /// Minimum initial balance for accounts created in this currency.
    pub new_account_min_balance: Big,
    pub feeer: Feeer,
}

impl CurrencyPolicy {
    pub fn new(new_account_min_balance: Big, feeer: Feeer) -> Self {
        Self {
            new_account_min_balance,
            feeer,
        }
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        if self.new_account_min_balance.is_negative() {
            return Err(ValidationError::Negative {
                field: "new account min balance",
            }
            .into());
        }
        self.feeer.is_valid()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.new_account_min_balance.to_bytes();
        b.extend_from_slice(&self.feeer.to_bytes());
        b
    }
}

/// Everything the ledger records about a registered currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDesign {
    /// Initial supply, denominated in the currency being described.
    pub amount: Amount,
    /// The account credited with the initial supply at registration.
    pub genesis_account: Address,
    pub policy: CurrencyPolicy,
    /// Total minted supply. Set to the initial amount at registration.
    pub aggregate: Big,
}

impl CurrencyDesign {
    pub fn new(amount: Amount, genesis_account: Address, policy: CurrencyPolicy) -> Self {
        let aggregate = amount.big.clone();
        Self {
            amount,
            genesis_account,
            policy,
            aggregate,
        }
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.amount.currency
    }

    /// The same design with its policy replaced.
    pub fn with_policy(&self, policy: CurrencyPolicy) -> Self {
        Self {
            amount: self.amount.clone(),
            genesis_account: self.genesis_account.clone(),
            policy,
            aggregate: self.aggregate.clone(),
        }
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        self.amount.is_valid()?;
        if !self.amount.big.over_zero() {
            return Err(ValidationError::NotOverZero {
                field: "initial supply",
            }
            .into());
        }
        self.genesis_account.is_valid()?;
        self.policy.is_valid()?;
        if !self.aggregate.over_zero() {
            return Err(ValidationError::NotOverZero { field: "aggregate" }.into());
        }
        Ok(())
    }

    /// Canonical byte form used when hashing facts that embed a design.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.amount.to_bytes();
        b.extend_from_slice(self.genesis_account.as_bytes());
        b.extend_from_slice(&self.policy.to_bytes());
        b.extend_from_slice(&self.aggregate.to_bytes());
        b
    }
}
