//! Weighted multisig key sets for accounts.

use serde::{Deserialize, Serialize};

use coinage_crypto::{blake2b_256, derive_address};
use coinage_types::{Address, Hash, PublicKey};

use crate::error::CurrencyError;

/// One public key with its signing weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    pub key: PublicKey,
    pub weight: u8,
}

impl AccountKey {
    pub const MIN_WEIGHT: u8 = 1;
    pub const MAX_WEIGHT: u8 = 100;

    pub fn new(key: PublicKey, weight: u8) -> Result<Self, CurrencyError> {
        let k = Self { key, weight };
        k.is_valid()?;
        Ok(k)
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        if !(Self::MIN_WEIGHT..=Self::MAX_WEIGHT).contains(&self.weight) {
            return Err(CurrencyError::InvalidWeight(self.weight));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.key.as_bytes().to_vec();
        b.push(self.weight);
        b
    }
}

/// An account's key set: weighted keys plus the threshold a set of
/// signatures must reach.
///
/// Keys are held sorted by key bytes, so the content hash (and the address
/// derived from it) is independent of the order keys were supplied in.
///
/// The key-weight sum is allowed to be below the threshold: such an account
/// exists but can never produce a satisfying signature set. The contract
/// account form pushes this to the limit with zero keys and threshold 100.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKeys {
    keys: Vec<AccountKey>,
    threshold: u8,
    hash: Hash,
}

impl AccountKeys {
    pub const MIN_THRESHOLD: u8 = 1;
    pub const MAX_THRESHOLD: u8 = 100;

    pub fn new(mut keys: Vec<AccountKey>, threshold: u8) -> Result<Self, CurrencyError> {
        if keys.is_empty() {
            return Err(CurrencyError::EmptyKeys);
        }
        if !(Self::MIN_THRESHOLD..=Self::MAX_THRESHOLD).contains(&threshold) {
            return Err(CurrencyError::InvalidThreshold(threshold));
        }
        for key in &keys {
            key.is_valid()?;
        }
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        for pair in keys.windows(2) {
            if pair[0].key == pair[1].key {
                return Err(CurrencyError::DuplicateKey(pair[0].key.to_string()));
            }
        }
        let hash = Self::compute_hash(&keys, threshold);
        Ok(Self {
            keys,
            threshold,
            hash,
        })
    }

    /// The locked key set stored for contract accounts: no keys, threshold
    /// 100. No signature set can ever satisfy it, so the account cannot sign
    /// operations itself.
    pub fn contract_locked() -> Self {
        let hash = Self::compute_hash(&[], Self::MAX_THRESHOLD);
        Self {
            keys: Vec::new(),
            threshold: Self::MAX_THRESHOLD,
            hash,
        }
    }

    fn bytes_of(keys: &[AccountKey], threshold: u8) -> Vec<u8> {
        let mut b = Vec::with_capacity(keys.len() * 33 + 1);
        for key in keys {
            b.extend_from_slice(&key.to_bytes());
        }
        b.push(threshold);
        b
    }

    fn compute_hash(keys: &[AccountKey], threshold: u8) -> Hash {
        Hash::new(blake2b_256(&Self::bytes_of(keys, threshold)))
    }

    /// Canonical byte form used when hashing facts that embed a key set.
    pub fn to_bytes(&self) -> Vec<u8> {
        Self::bytes_of(&self.keys, self.threshold)
    }

    pub fn keys(&self) -> &[AccountKey] {
        &self.keys
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Weight of the given key, or `None` if it is not part of the set.
    pub fn weight_of(&self, key: &PublicKey) -> Option<u8> {
        self.keys
            .iter()
            .find(|k| &k.key == key)
            .map(|k| k.weight)
    }

    /// The address this key set derives to.
    pub fn address(&self) -> Address {
        derive_address(&self.hash)
    }

    /// Full check after decoding from the wire: shape, canonical order, and
    /// hash consistency. The empty form is accepted only with threshold 100.
    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        if self.keys.is_empty() && self.threshold != Self::MAX_THRESHOLD {
            return Err(CurrencyError::EmptyKeys);
        }
        if !(Self::MIN_THRESHOLD..=Self::MAX_THRESHOLD).contains(&self.threshold) {
            return Err(CurrencyError::InvalidThreshold(self.threshold));
        }
        for key in &self.keys {
            key.is_valid()?;
        }
        for pair in self.keys.windows(2) {
            if pair[0].key >= pair[1].key {
                return Err(CurrencyError::KeysNotSorted);
            }
        }
        if Self::compute_hash(&self.keys, self.threshold) != self.hash {
            return Err(CurrencyError::KeysHashMismatch);
        }
        Ok(())
    }
}
