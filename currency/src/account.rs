//! Accounts and contract account status records.

use serde::{Deserialize, Serialize};

use coinage_types::Address;

use crate::error::CurrencyError;
use crate::keys::AccountKeys;

/// An account as stored in ledger state: its derived address and key set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub keys: AccountKeys,
}

impl Account {
    /// An ordinary account; the address is derived from the key set.
    pub fn new(keys: AccountKeys) -> Self {
        Self {
            address: keys.address(),
            keys,
        }
    }

    /// A contract account: addressed by the key set supplied at creation,
    /// stored with the locked key set so it can never sign.
    pub fn contract(derivation_keys: &AccountKeys) -> Self {
        Self {
            address: derivation_keys.address(),
            keys: AccountKeys::contract_locked(),
        }
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        self.address.is_valid()?;
        self.keys.is_valid()?;
        Ok(())
    }
}

/// Ledger-state record marking an address as a contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccountStatus {
    /// The ordinary account that created and controls the contract account.
    pub owner: Address,
    pub is_active: bool,
}

impl ContractAccountStatus {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            is_active: true,
        }
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        self.owner.is_valid()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::AccountKey;
    use coinage_types::PublicKey;

    fn some_keys() -> AccountKeys {
        AccountKeys::new(vec![AccountKey::new(PublicKey([5u8; 32]), 100).unwrap()], 100).unwrap()
    }

    #[test]
    fn account_address_matches_keys() {
        let keys = some_keys();
        let account = Account::new(keys.clone());
        assert_eq!(account.address, keys.address());
        assert!(account.is_valid().is_ok());
    }

    #[test]
    fn contract_account_keeps_derivation_address_but_locks_keys() {
        let keys = some_keys();
        let account = Account::contract(&keys);
        assert_eq!(account.address, keys.address());
        assert!(account.keys.keys().is_empty());
        assert_eq!(account.keys.threshold(), 100);
        assert!(account.is_valid().is_ok());
    }

    #[test]
    fn status_starts_active() {
        let owner = some_keys().address();
        let status = ContractAccountStatus::new(owner.clone());
        assert!(status.is_active);
        assert_eq!(status.owner, owner);
    }
}
