//! Ed25519 signing and verification over fact bytes.
//!
//! Fact signatures never cover the raw fact bytes alone: the network id is
//! appended first, so a signature produced for one network is invalid on
//! every other.

use coinage_types::{NetworkId, PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Sign a raw message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a raw message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// The byte string actually signed for a fact: fact bytes, then network id.
pub fn signing_base(fact_bytes: &[u8], network: &NetworkId) -> Vec<u8> {
    let mut base = Vec::with_capacity(fact_bytes.len() + network.as_bytes().len());
    base.extend_from_slice(fact_bytes);
    base.extend_from_slice(network.as_bytes());
    base
}

/// Sign a fact's canonical bytes for the given network.
pub fn sign_fact(fact_bytes: &[u8], network: &NetworkId, private_key: &PrivateKey) -> Signature {
    sign_message(&signing_base(fact_bytes, network), private_key)
}

/// Verify a fact signature for the given network.
pub fn verify_fact(
    fact_bytes: &[u8],
    network: &NetworkId,
    signature: &Signature,
    public_key: &PublicKey,
) -> bool {
    verify_signature(&signing_base(fact_bytes, network), signature, public_key)
}
