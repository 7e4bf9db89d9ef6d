//! Transfer operation: move funds from one account to one or more receivers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use coinage_types::{Address, Amount, Hash, Token, ValidationError};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// One receiver with the amounts it is sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub receiver: Address,
    pub amounts: Vec<Amount>,
}

impl TransferItem {
    pub const MAX_AMOUNTS: usize = 10;

    pub fn new(receiver: Address, amounts: Vec<Amount>) -> Self {
        Self { receiver, amounts }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.receiver.as_bytes().to_vec();
        for amount in &self.amounts {
            b.extend_from_slice(&amount.to_bytes());
        }
        b
    }

    pub fn is_valid(&self) -> Result<(), OperationError> {
        self.receiver.is_valid()?;
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

/// Intent to transfer amounts from `sender` to each item's receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFact {
    token: Token,
    pub sender: Address,
    pub items: Vec<TransferItem>,
    hash: Hash,
}

impl TransferFact {
    pub const MAX_ITEMS: usize = 10;

    pub fn new(token: Token, sender: Address, items: Vec<TransferItem>) -> Self {
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

impl Fact for TransferFact {
    fn kind(&self) -> OpKind {
        OpKind::Transfer
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
        let mut receivers = HashSet::new();
        for item in &self.items {
            item.is_valid()?;
            if item.receiver == self.sender {
                return Err(OperationError::SameAsSender(item.receiver.to_string()));
            }
            if !receivers.insert(&item.receiver) {
                return Err(OperationError::DuplicateAddress(item.receiver.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_crypto::derive_address;
    use coinage_crypto::blake2b_256;
    use coinage_types::{Big, CurrencyId};

    fn addr(seed: &[u8]) -> Address {
        derive_address(&Hash::new(blake2b_256(seed)))
    }

    fn pen(v: u64) -> Amount {
        Amount::new(Big::from(v), CurrencyId::new("PEN").unwrap())
    }

    fn mcc(v: u64) -> Amount {
        Amount::new(Big::from(v), CurrencyId::new("MCC").unwrap())
    }

    fn fact(items: Vec<TransferItem>) -> TransferFact {
        TransferFact::new(Token::from_text("t").unwrap(), addr(b"sender"), items)
    }

    #[test]
    fn valid_multi_currency_item() {
        let f = fact(vec![TransferItem::new(addr(b"r1"), vec![pen(10), mcc(5)])]);
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
    fn item_cap_enforced() {
        let items: Vec<_> = (0..11)
            .map(|i| TransferItem::new(addr(&[i as u8]), vec![pen(1)]))
            .collect();
        assert!(matches!(
            fact(items).is_valid(),
            Err(OperationError::TooManyItems { len: 11, max: 10 })
        ));
    }

    #[test]
    fn amount_cap_enforced() {
        let amounts: Vec<_> = (0..11)
            .map(|i| {
                let id = format!("C{i:02}");
                Amount::new(Big::from(1u64), CurrencyId::new(id).unwrap())
            })
            .collect();
        let f = fact(vec![TransferItem::new(addr(b"r1"), amounts)]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::TooManyAmounts { len: 11, max: 10 })
        ));
    }

    #[test]
    fn duplicate_currency_in_item_rejected() {
        let f = fact(vec![TransferItem::new(addr(b"r1"), vec![pen(10), pen(5)])]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateCurrency(_))
        ));
    }

    #[test]
    fn duplicate_receiver_across_items_rejected() {
        let f = fact(vec![
            TransferItem::new(addr(b"r1"), vec![pen(10)]),
            TransferItem::new(addr(b"r1"), vec![mcc(5)]),
        ]);
        assert!(matches!(
            f.is_valid(),
            Err(OperationError::DuplicateAddress(_))
        ));
    }

    #[test]
    fn receiver_equal_to_sender_rejected() {
        let f = fact(vec![TransferItem::new(addr(b"sender"), vec![pen(10)])]);
        assert!(matches!(f.is_valid(), Err(OperationError::SameAsSender(_))));
    }

    #[test]
    fn zero_amount_rejected() {
        let f = fact(vec![TransferItem::new(addr(b"r1"), vec![pen(0)])]);
        assert!(f.is_valid().is_err());
    }

    #[test]
    fn item_order_changes_hash() {
        let a = fact(vec![
            TransferItem::new(addr(b"r1"), vec![pen(10)]),
            TransferItem::new(addr(b"r2"), vec![pen(20)]),
        ]);
        let b = fact(vec![
            TransferItem::new(addr(b"r2"), vec![pen(20)]),
            TransferItem::new(addr(b"r1"), vec![pen(10)]),
        ]);
        assert_ne!(a.hash(), b.hash());
    }
}
