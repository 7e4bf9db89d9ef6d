//! Genesis bootstrap operation: create the first account and register the
//! initial currencies in one step.
//!
//! Signed only by the designated genesis node key; once the genesis account
//! exists this operation can never apply again.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use coinage_currency::{AccountKeys, CurrencyDesign};
use coinage_types::{Address, Hash, PublicKey, Token};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// Intent to bootstrap the ledger: the genesis account's key set and the
/// currency designs it starts with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCurrenciesFact {
    token: Token,
    /// The node key that must sign this operation.
    pub genesis_node_key: PublicKey,
    /// Key set of the genesis account; every design's genesis account must
    /// be the address this set derives to.
    pub keys: AccountKeys,
    pub currencies: Vec<CurrencyDesign>,
    hash: Hash,
}

impl GenesisCurrenciesFact {
    pub fn new(
        token: Token,
        genesis_node_key: PublicKey,
        keys: AccountKeys,
        currencies: Vec<CurrencyDesign>,
    ) -> Self {
        let mut fact = Self {
            token,
            genesis_node_key,
            keys,
            currencies,
            hash: Hash::ZERO,
        };
        fact.hash = fact.compute_hash();
        fact
    }

    /// The address of the genesis account being created.
    pub fn genesis_address(&self) -> Address {
        self.keys.address()
    }
}

impl Fact for GenesisCurrenciesFact {
    fn kind(&self) -> OpKind {
        OpKind::GenesisCurrencies
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut b = self.token.as_bytes().to_vec();
        b.extend_from_slice(self.genesis_node_key.as_bytes());
        b.extend_from_slice(&self.keys.to_bytes());
        for design in &self.currencies {
            b.extend_from_slice(&design.to_bytes());
        }
        b
    }

    fn is_valid(&self) -> Result<(), OperationError> {
        if self.compute_hash() != self.hash {
            return Err(OperationError::FactHashMismatch);
        }
        self.token.is_valid()?;
        self.keys.is_valid()?;
        if self.currencies.is_empty() {
            return Err(OperationError::EmptyCurrencies);
        }
        let genesis = self.genesis_address();
        let mut currencies = HashSet::new();
        for design in &self.currencies {
            design.is_valid()?;
            if design.genesis_account != genesis {
                return Err(OperationError::GenesisAccountMismatch(
                    design.currency().to_string(),
                ));
            }
            if !currencies.insert(design.currency().clone()) {
                return Err(OperationError::DuplicateCurrency(
                    design.currency().to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_currency::{AccountKey, CurrencyPolicy, Feeer};
    use coinage_types::{Amount, Big, CurrencyId};

    fn genesis_keys() -> AccountKeys {
        AccountKeys::new(vec![AccountKey::new(PublicKey([1u8; 32]), 100).unwrap()], 100).unwrap()
    }

    fn design(currency: &str, genesis: Address) -> CurrencyDesign {
        CurrencyDesign::new(
            Amount::new(Big::from(1_000_000u64), CurrencyId::new(currency).unwrap()),
            genesis,
            CurrencyPolicy::new(Big::from(1u64), Feeer::Nil),
        )
    }

    fn fact(currencies: Vec<CurrencyDesign>) -> GenesisCurrenciesFact {
        GenesisCurrenciesFact::new(
            Token::from_text("genesis").unwrap(),
            PublicKey([9u8; 32]),
            genesis_keys(),
            currencies,
        )
    }

    #[test]
    fn valid_fact() {
        let genesis = genesis_keys().address();
        let f = fact(vec![
            design("PEN", genesis.clone()),
            design("MCC", genesis),
        ]);
        assert!(f.is_valid().is_ok());
    }

    #[test]
    fn no_currencies_rejected() {
        assert!(matches!(
            fact(vec![]).is_valid(),
            Err(OperationError::EmptyCurrencies)
        ));
    }

    #[test]
    fn duplicate_currency_rejected() {
        let genesis = genesis_keys().address();
        let f = fact(vec![
            design("PEN", genesis.clone()),
            design("PEN", genesis),
        ]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateCurrency(_))
        ));
    }

    #[test]
    fn foreign_genesis_account_rejected() {
        let other = AccountKeys::new(vec![AccountKey::new(PublicKey([7u8; 32]), 100).unwrap()], 100)
            .unwrap()
            .address();
        let f = fact(vec![design("PEN", other)]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::GenesisAccountMismatch(_))
        ));
    }
}
