//! Facts and signed operations.
//!
//! A fact is the immutable content of a transaction intent: a token, the
//! kind-specific payload, and a Blake2b-256 hash over its canonical bytes,
//! computed once at construction. An operation wraps a fact with the
//! signatures collected for it; the operation hash covers the fact hash and
//! every signature, so it changes whenever a signature is added.

use serde::{Deserialize, Serialize};

use coinage_crypto::{blake2b_256, blake2b_256_multi, public_from_private, sign_fact, verify_fact};
use coinage_types::{Hash, NetworkId, PrivateKey, PublicKey, Signature, Token};

use crate::error::OperationError;
use crate::OpKind;

/// Common surface of every fact kind.
pub trait Fact {
    fn kind(&self) -> OpKind;
    fn token(&self) -> &Token;
    fn hash(&self) -> &Hash;

    /// Canonical byte form: token first, then every payload field in
    /// declaration order. This is the hashing and signing base.
    fn bytes(&self) -> Vec<u8>;

    /// Validate every field and confirm the stored hash matches the
    /// contents (tamper detection after decoding).
    fn is_valid(&self) -> Result<(), OperationError>;

    fn compute_hash(&self) -> Hash {
        Hash::new(blake2b_256(&self.bytes()))
    }
}

/// One signer's signature over a fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSignature {
    pub signer: PublicKey,
    pub signature: Signature,
}

impl FactSignature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.signer.as_bytes().to_vec();
        b.extend_from_slice(self.signature.as_bytes());
        b
    }
}

/// A fact plus the signatures collected for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation<F> {
    pub fact: F,
    signs: Vec<FactSignature>,
    hash: Hash,
}

impl<F: Fact> Operation<F> {
    /// Wrap a fact with no signatures yet.
    pub fn new(fact: F) -> Self {
        let hash = Self::compute_hash(fact.hash(), &[]);
        Self {
            fact,
            signs: Vec::new(),
            hash,
        }
    }

    fn compute_hash(fact_hash: &Hash, signs: &[FactSignature]) -> Hash {
        let sign_bytes: Vec<Vec<u8>> = signs.iter().map(FactSignature::to_bytes).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + sign_bytes.len());
        parts.push(fact_hash.as_bytes());
        for b in &sign_bytes {
            parts.push(b);
        }
        Hash::new(blake2b_256_multi(&parts))
    }

    /// Sign the fact for `network` and append the signature.
    ///
    /// Idempotent per signer: signing again with the same key replaces the
    /// earlier signature instead of appending a duplicate. The operation
    /// hash is recomputed either way.
    pub fn hash_sign(&mut self, private_key: &PrivateKey, network: &NetworkId) {
        let signer = public_from_private(private_key);
        let signature = sign_fact(&self.fact.bytes(), network, private_key);
        let sign = FactSignature { signer, signature };
        match self.signs.iter_mut().find(|s| s.signer == signer) {
            Some(existing) => *existing = sign,
            None => self.signs.push(sign),
        }
        self.hash = Self::compute_hash(self.fact.hash(), &self.signs);
    }

    pub fn signs(&self) -> &[FactSignature] {
        &self.signs
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Validate the fact, every signature, and both hashes.
    pub fn is_valid(&self, network: &NetworkId) -> Result<(), OperationError> {
        self.fact.is_valid()?;
        if self.signs.is_empty() {
            return Err(OperationError::NoSignatures);
        }
        for (i, sign) in self.signs.iter().enumerate() {
            if self.signs[..i].iter().any(|s| s.signer == sign.signer) {
                return Err(OperationError::DuplicateSigner(sign.signer.to_string()));
            }
        }
        let fact_bytes = self.fact.bytes();
        for sign in &self.signs {
            if !verify_fact(&fact_bytes, network, &sign.signature, &sign.signer) {
                return Err(OperationError::InvalidSignature(sign.signer.to_string()));
            }
        }
        if Self::compute_hash(self.fact.hash(), &self.signs) != self.hash {
            return Err(OperationError::OperationHashMismatch);
        }
        Ok(())
    }
}
