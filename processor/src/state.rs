//! Ledger-state accessor abstraction and the deterministic key scheme.
//!
//! The processor core never writes state: it reads through [`StateAccessor`]
//! and returns [`crate::StateMergeValue`] descriptions for the host to
//! commit. Keys are plain strings derived per entity kind, so any key-value
//! backend can serve them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use coinage_currency::{Account, ContractAccountStatus, CurrencyDesign};
use coinage_types::{Address, Amount, Big, CurrencyId};

use crate::error::PassFault;
use crate::merge::{Merge, StateMergeValue};
use crate::suffrage::SuffrageNode;

/// Key of the suffrage membership slot.
pub const SUFFRAGE_KEY: &str = "suffrage:nodes";

/// Key of an account record.
pub fn account_key(address: &Address) -> String {
    format!("{address}:account")
}

/// Key of one account's balance in one currency.
pub fn balance_key(address: &Address, currency: &CurrencyId) -> String {
    format!("{address}-{currency}:balance")
}

/// Key of a currency design.
pub fn currency_design_key(currency: &CurrencyId) -> String {
    format!("{currency}:currency")
}

/// Key of the contract-account status record of an address.
pub fn contract_status_key(address: &Address) -> String {
    format!("{address}:contract")
}

/// The typed values stored in ledger state slots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValue {
    Account(Account),
    Balance(Amount),
    CurrencyDesign(CurrencyDesign),
    ContractAccount(ContractAccountStatus),
    SuffrageNodes(Vec<SuffrageNode>),
}

impl StateValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Balance(_) => "balance",
            Self::CurrencyDesign(_) => "currency design",
            Self::ContractAccount(_) => "contract account status",
            Self::SuffrageNodes(_) => "suffrage nodes",
        }
    }
}

/// Failure in the state backend itself, as opposed to a missing slot.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state backend failure: {0}")]
    Backend(String),
}

/// Synchronous ledger-state lookup supplied by the host.
pub trait StateAccessor {
    fn get(&self, key: &str) -> Result<Option<StateValue>, StateError>;
}

/// Fetch an account record, failing the pass if the slot holds a different
/// value kind.
pub fn get_account(
    state: &dyn StateAccessor,
    address: &Address,
) -> Result<Option<Account>, PassFault> {
    let key = account_key(address);
    match state.get(&key)? {
        None => Ok(None),
        Some(StateValue::Account(account)) => Ok(Some(account)),
        Some(other) => Err(PassFault::corrupt(key, "account", &other)),
    }
}

/// Fetch a balance slot.
pub fn get_balance(
    state: &dyn StateAccessor,
    address: &Address,
    currency: &CurrencyId,
) -> Result<Option<Amount>, PassFault> {
    let key = balance_key(address, currency);
    match state.get(&key)? {
        None => Ok(None),
        Some(StateValue::Balance(amount)) => Ok(Some(amount)),
        Some(other) => Err(PassFault::corrupt(key, "balance", &other)),
    }
}

/// Fetch a currency design.
pub fn get_design(
    state: &dyn StateAccessor,
    currency: &CurrencyId,
) -> Result<Option<CurrencyDesign>, PassFault> {
    let key = currency_design_key(currency);
    match state.get(&key)? {
        None => Ok(None),
        Some(StateValue::CurrencyDesign(design)) => Ok(Some(design)),
        Some(other) => Err(PassFault::corrupt(key, "currency design", &other)),
    }
}

/// Fetch the contract-account status of an address, if it has one.
pub fn get_contract_status(
    state: &dyn StateAccessor,
    address: &Address,
) -> Result<Option<ContractAccountStatus>, PassFault> {
    let key = contract_status_key(address);
    match state.get(&key)? {
        None => Ok(None),
        Some(StateValue::ContractAccount(status)) => Ok(Some(status)),
        Some(other) => Err(PassFault::corrupt(key, "contract account status", &other)),
    }
}

/// In-memory state backend: a plain map plus merge application.
///
/// Hosts bring their own storage; this one backs the tests and makes the
/// merge-folding semantics concrete.
#[derive(Clone, Debug, Default)]
pub struct MemoryState {
    slots: HashMap<String, StateValue>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: StateValue) {
        self.slots.insert(key.into(), value);
    }

    /// Apply a processed operation's merges in order.
    ///
    /// `Put` replaces the slot; `BalanceDelta` adds into the existing
    /// balance (creating a zero balance first if the slot is empty), which
    /// is what makes several operations' deltas on one slot fold the same
    /// in any grouping.
    pub fn apply(&mut self, merges: &[StateMergeValue]) -> Result<(), StateError> {
        for merge in merges {
            match &merge.merge {
                Merge::Put(value) => {
                    self.slots.insert(merge.key.clone(), value.clone());
                }
                Merge::BalanceDelta { currency, delta } => {
                    let slot = self
                        .slots
                        .entry(merge.key.clone())
                        .or_insert_with(|| StateValue::Balance(Amount::zero(currency.clone())));
                    match slot {
                        StateValue::Balance(amount) => {
                            amount.big = &amount.big + delta;
                        }
                        other => {
                            return Err(StateError::Backend(format!(
                                "balance delta against {} slot {}",
                                other.type_name(),
                                merge.key
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Convenience for tests and inspection.
    pub fn balance_of(&self, address: &Address, currency: &CurrencyId) -> Big {
        match self.slots.get(&balance_key(address, currency)) {
            Some(StateValue::Balance(amount)) => amount.big.clone(),
            _ => Big::zero(),
        }
    }
}

impl StateAccessor for MemoryState {
    fn get(&self, key: &str) -> Result<Option<StateValue>, StateError> {
        Ok(self.slots.get(key).cloned())
    }
}
