//! Cryptographic primitives for coinage.
//!
//! - **Ed25519** for fact signing and signature verification
//! - **Blake2b-256** for fact, operation, and key-set hashes
//! - Address derivation with `cng_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_fact, sign_message, signing_base, verify_fact, verify_signature};
