//! Facts, signed operations, and the signature-threshold verifier.
//!
//! A fact is an immutable, hashed transaction intent; an operation wraps a
//! fact with one or more signatures. [`AnyOperation`] is the wire form: an
//! externally tagged enum over every operation kind, so a decoder can pick
//! the right variant from the tag alone.

pub mod create_contract_account;
pub mod currency_register;
pub mod error;
pub mod fact;
pub mod genesis;
pub mod policy_updater;
pub mod threshold;
pub mod transfer;
pub mod withdraw;

use serde::{Deserialize, Serialize};
use std::fmt;

use coinage_types::{Hash, NetworkId, PrivateKey};

pub use create_contract_account::{CreateContractAccountFact, CreateContractAccountItem};
pub use currency_register::CurrencyRegisterFact;
pub use error::OperationError;
pub use fact::{Fact, FactSignature, Operation};
pub use genesis::GenesisCurrenciesFact;
pub use policy_updater::CurrencyPolicyUpdaterFact;
pub use threshold::{check_signs_threshold, SignerWeights, ThresholdError};
pub use transfer::{TransferFact, TransferItem};
pub use withdraw::{WithdrawFact, WithdrawItem};

/// The operation kinds this module defines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
    CurrencyRegister,
    CurrencyPolicyUpdater,
    Transfer,
    Withdraw,
    CreateContractAccount,
    GenesisCurrencies,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrencyRegister => "currency-register",
            Self::CurrencyPolicyUpdater => "currency-policy-updater",
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
            Self::CreateContractAccount => "create-contract-account",
            Self::GenesisCurrencies => "genesis-currencies",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any operation, tagged by kind for the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnyOperation {
    CurrencyRegister(Operation<CurrencyRegisterFact>),
    CurrencyPolicyUpdater(Operation<CurrencyPolicyUpdaterFact>),
    Transfer(Operation<TransferFact>),
    Withdraw(Operation<WithdrawFact>),
    CreateContractAccount(Operation<CreateContractAccountFact>),
    GenesisCurrencies(Operation<GenesisCurrenciesFact>),
}

impl AnyOperation {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::CurrencyRegister(_) => OpKind::CurrencyRegister,
            Self::CurrencyPolicyUpdater(_) => OpKind::CurrencyPolicyUpdater,
            Self::Transfer(_) => OpKind::Transfer,
            Self::Withdraw(_) => OpKind::Withdraw,
            Self::CreateContractAccount(_) => OpKind::CreateContractAccount,
            Self::GenesisCurrencies(_) => OpKind::GenesisCurrencies,
        }
    }

    pub fn hash(&self) -> &Hash {
        match self {
            Self::CurrencyRegister(op) => op.hash(),
            Self::CurrencyPolicyUpdater(op) => op.hash(),
            Self::Transfer(op) => op.hash(),
            Self::Withdraw(op) => op.hash(),
            Self::CreateContractAccount(op) => op.hash(),
            Self::GenesisCurrencies(op) => op.hash(),
        }
    }

    pub fn fact_hash(&self) -> &Hash {
        match self {
            Self::CurrencyRegister(op) => op.fact.hash(),
            Self::CurrencyPolicyUpdater(op) => op.fact.hash(),
            Self::Transfer(op) => op.fact.hash(),
            Self::Withdraw(op) => op.fact.hash(),
            Self::CreateContractAccount(op) => op.fact.hash(),
            Self::GenesisCurrencies(op) => op.fact.hash(),
        }
    }

    pub fn signs(&self) -> &[FactSignature] {
        match self {
            Self::CurrencyRegister(op) => op.signs(),
            Self::CurrencyPolicyUpdater(op) => op.signs(),
            Self::Transfer(op) => op.signs(),
            Self::Withdraw(op) => op.signs(),
            Self::CreateContractAccount(op) => op.signs(),
            Self::GenesisCurrencies(op) => op.signs(),
        }
    }

    /// Sign (or re-sign) the wrapped operation for `network`.
    pub fn hash_sign(&mut self, private_key: &PrivateKey, network: &NetworkId) {
        match self {
            Self::CurrencyRegister(op) => op.hash_sign(private_key, network),
            Self::CurrencyPolicyUpdater(op) => op.hash_sign(private_key, network),
            Self::Transfer(op) => op.hash_sign(private_key, network),
            Self::Withdraw(op) => op.hash_sign(private_key, network),
            Self::CreateContractAccount(op) => op.hash_sign(private_key, network),
            Self::GenesisCurrencies(op) => op.hash_sign(private_key, network),
        }
    }

    pub fn is_valid(&self, network: &NetworkId) -> Result<(), OperationError> {
        match self {
            Self::CurrencyRegister(op) => op.is_valid(network),
            Self::CurrencyPolicyUpdater(op) => op.is_valid(network),
            Self::Transfer(op) => op.is_valid(network),
            Self::Withdraw(op) => op.is_valid(network),
            Self::CreateContractAccount(op) => op.is_valid(network),
            Self::GenesisCurrencies(op) => op.is_valid(network),
        }
    }
}
