//! Withdraw operation: pull funds out of a contract account owned by the
//! sender.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use coinage_types::{Address, Amount, Hash, Token, ValidationError};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// One contract account with the amounts withdrawn from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawItem {
    pub target: Address,
    pub amounts: Vec<Amount>,
}

impl WithdrawItem {
    pub const MAX_AMOUNTS: usize = 10;

    pub fn new(target: Address, amounts: Vec<Amount>) -> Self {
        Self { target, amounts }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.target.as_bytes().to_vec();
        for amount in &self.amounts {
            b.extend_from_slice(&amount.to_bytes());
        }
        b
    }

    pub fn is_valid(&self) -> Result<(), OperationError> {
        self.target.is_valid()?;
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

/// Intent to withdraw amounts from each item's contract account into
/// `sender`, the owning account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawFact {
    token: Token,
    pub sender: Address,
    pub items: Vec<WithdrawItem>,
    hash: Hash,
}

impl WithdrawFact {
    pub const MAX_ITEMS: usize = 10;

    pub fn new(token: Token, sender: Address, items: Vec<WithdrawItem>) -> Self {
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

impl Fact for WithdrawFact {
    fn kind(&self) -> OpKind {
        OpKind::Withdraw
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
        let mut targets = HashSet::new();
        for item in &self.items {
            item.is_valid()?;
            if item.target == self.sender {
                return Err(OperationError::SameAsSender(item.target.to_string()));
            }
            if !targets.insert(&item.target) {
                return Err(OperationError::DuplicateAddress(item.target.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_crypto::{blake2b_256, derive_address};
    use coinage_types::{Big, CurrencyId};

    fn addr(seed: &[u8]) -> Address {
        derive_address(&Hash::new(blake2b_256(seed)))
    }

    fn pen(v: u64) -> Amount {
        Amount::new(Big::from(v), CurrencyId::new("PEN").unwrap())
    }

    fn fact(items: Vec<WithdrawItem>) -> WithdrawFact {
        WithdrawFact::new(Token::from_text("t").unwrap(), addr(b"owner"), items)
    }

    #[test]
    fn valid_fact() {
        let f = fact(vec![WithdrawItem::new(addr(b"contract"), vec![pen(10)])]);
        assert!(f.is_valid().is_ok());
    }

    #[test]
    fn empty_items_rejected() {
        assert!(matches!(
            fact(vec![]).is_valid(),
            Err(OperationError::EmptyItems)
        ));
    }

    #[test]
    fn target_equal_to_sender_rejected() {
        let f = fact(vec![WithdrawItem::new(addr(b"owner"), vec![pen(10)])]);
        assert!(matches!(f.is_valid(), Err(OperationError::SameAsSender(_))));
    }

    #[test]
    fn duplicate_target_rejected() {
        let f = fact(vec![
            WithdrawItem::new(addr(b"contract"), vec![pen(10)]),
            WithdrawItem::new(addr(b"contract"), vec![pen(20)]),
        ]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateAddress(_))
        ));
    }

    #[test]
    fn duplicate_currency_in_item_rejected() {
        let f = fact(vec![WithdrawItem::new(addr(b"contract"), vec![pen(10), pen(1)])]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateCurrency(_))
        ));
    }

    #[test]
    fn zero_amount_rejected() {
        let f = fact(vec![WithdrawItem::new(addr(b"contract"), vec![pen(0)])]);
        assert!(f.is_valid().is_err());
    }
}
