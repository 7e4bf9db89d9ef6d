//! Create-contract-account operation: set up accounts that can hold funds
//! but never sign, addressed by a key set supplied at creation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use coinage_currency::AccountKeys;
use coinage_types::{Address, Amount, Hash, Token, ValidationError};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// One contract account to create: the key set its address derives from and
/// its initial balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContractAccountItem {
    pub keys: AccountKeys,
    pub amounts: Vec<Amount>,
}

impl CreateContractAccountItem {
    pub const MAX_AMOUNTS: usize = 10;

    pub fn new(keys: AccountKeys, amounts: Vec<Amount>) -> Self {
        Self { keys, amounts }
    }

    /// The address the new contract account will live at.
    pub fn address(&self) -> Address {
        self.keys.address()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.keys.to_bytes();
        for amount in &self.amounts {
            b.extend_from_slice(&amount.to_bytes());
        }
        b
    }

    pub fn is_valid(&self) -> Result<(), OperationError> {
        self.keys.is_valid()?;
        if self.amounts.is_empty() {
            return Err(OperationError::EmptyAmounts);
        }
        if self.amounts.len() > Self::MAX_AMOUNTS {
            return Err(OperationError::TooManyAmounts {
                len: self.amounts.len(),
                max: Self::MAX_AMOUNTS,
            });
        }
        let mut currencies = HashSet::new();
        for amount in &self.amounts {
            amount.is_valid()?;
            if !amount.big.over_zero() {
                return Err(ValidationError::NotOverZero { field: "amount" }.into());
            }
            if !currencies.insert(&amount.currency) {
                return Err(OperationError::DuplicateCurrency(
                    amount.currency.to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Intent by `sender` to create and fund each item's contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContractAccountFact {
    token: Token,
    pub sender: Address,
    pub items: Vec<CreateContractAccountItem>,
    hash: Hash,
}

impl CreateContractAccountFact {
    pub const MAX_ITEMS: usize = 10;

    pub fn new(token: Token, sender: Address, items: Vec<CreateContractAccountItem>) -> Self {
        let mut fact = Self {
            token,
            sender,
            items,
            hash: Hash::ZERO,
        };
        fact.hash = fact.compute_hash();
        fact
    }
}

impl Fact for CreateContractAccountFact {
    fn kind(&self) -> OpKind {
        OpKind::CreateContractAccount
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut b = self.token.as_bytes().to_vec();
        b.extend_from_slice(self.sender.as_bytes());
        for item in &self.items {
            b.extend_from_slice(&item.to_bytes());
        }
        b
    }

    fn is_valid(&self) -> Result<(), OperationError> {
        if self.compute_hash() != self.hash {
            return Err(OperationError::FactHashMismatch);
        }
        self.token.is_valid()?;
        self.sender.is_valid()?;
        if self.items.is_empty() {
            return Err(OperationError::EmptyItems);
        }
        if self.items.len() > Self::MAX_ITEMS {
            return Err(OperationError::TooManyItems {
                len: self.items.len(),
                max: Self::MAX_ITEMS,
            });
        }
        let mut addresses = HashSet::new();
        for item in &self.items {
            item.is_valid()?;
            let address = item.address();
            if address == self.sender {
                return Err(OperationError::SameAsSender(address.to_string()));
            }
            if !addresses.insert(address.clone()) {
                return Err(OperationError::DuplicateAddress(address.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_crypto::{blake2b_256, derive_address};
    use coinage_currency::AccountKey;
    use coinage_types::{Big, CurrencyId, PublicKey};

    fn keys(byte: u8) -> AccountKeys {
        AccountKeys::new(vec![AccountKey::new(PublicKey([byte; 32]), 100).unwrap()], 100).unwrap()
    }

    fn pen(v: u64) -> Amount {
        Amount::new(Big::from(v), CurrencyId::new("PEN").unwrap())
    }

    fn fact(items: Vec<CreateContractAccountItem>) -> CreateContractAccountFact {
        let sender = derive_address(&Hash::new(blake2b_256(b"sender")));
        CreateContractAccountFact::new(Token::from_text("t").unwrap(), sender, items)
    }

    #[test]
    fn valid_fact() {
        let f = fact(vec![CreateContractAccountItem::new(keys(1), vec![pen(100)])]);
        assert!(f.is_valid().is_ok());
    }

    #[test]
    fn duplicate_derived_address_rejected() {
        // Same key set twice derives the same address.
        let f = fact(vec![
            CreateContractAccountItem::new(keys(1), vec![pen(100)]),
            CreateContractAccountItem::new(keys(1), vec![pen(200)]),
        ]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateAddress(_))
        ));
    }

    #[test]
    fn derived_address_equal_to_sender_rejected() {
        let derivation = keys(1);
        let f = CreateContractAccountFact::new(
            Token::from_text("t").unwrap(),
            derivation.address(),
            vec![CreateContractAccountItem::new(derivation, vec![pen(100)])],
        );
        assert!(matches!(f.is_valid(), Err(OperationError::SameAsSender(_))));
    }

    #[test]
    fn empty_amounts_rejected() {
        let f = fact(vec![CreateContractAccountItem::new(keys(1), vec![])]);
        assert!(matches!(f.is_valid(), Err(OperationError::EmptyAmounts)));
    }

    #[test]
    fn zero_initial_amount_rejected() {
        let f = fact(vec![CreateContractAccountItem::new(keys(1), vec![pen(0)])]);
        assert!(f.is_valid().is_err());
    }
}
