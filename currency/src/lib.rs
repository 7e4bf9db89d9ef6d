//! Currency designs, fee policies, and account key sets.
//!
//! A currency is described by a [`CurrencyDesign`]: its initial supply, the
//! genesis account that received it, and a [`CurrencyPolicy`] holding the
//! minimum balance for new accounts and the [`Feeer`] fee policy. Accounts
//! are multisig: an [`AccountKeys`] set pairs weighted public keys with a
//! signing threshold.

pub mod account;
pub mod design;
pub mod error;
pub mod feeer;
pub mod keys;

pub use account::{Account, ContractAccountStatus};
pub use design::{CurrencyDesign, CurrencyPolicy};
pub use error::CurrencyError;
pub use feeer::Feeer;
pub use keys::{AccountKey, AccountKeys};
