//! Fundamental types for the coinage currency module.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! arbitrary-precision amounts, currency ids, addresses, hashes, tokens, and key types.

pub mod address;
pub mod amount;
pub mod big;
pub mod currency;
pub mod error;
pub mod hash;
pub mod height;
pub mod keys;
pub mod network;
pub mod token;

pub use address::Address;
pub use amount::Amount;
pub use big::Big;
pub use currency::CurrencyId;
pub use error::ValidationError;
pub use hash::Hash;
pub use height::Height;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use token::Token;
