//! Account address type with `cng_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::CurrencyId;
use crate::error::ValidationError;

/// An account address, always prefixed with `cng_`.
///
/// Two forms exist:
/// - **derived**: prefix + 60 base32 characters (key-set hash + checksum),
///   produced by `coinage_crypto::derive_address`;
/// - **zero**: prefix + `zero` + lowercased currency id, the per-currency
///   bookkeeping account created at registration.
///
/// This type checks shape only (prefix, length, charset). Checksum
/// verification of derived addresses lives in `coinage_crypto`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all coinage addresses.
    pub const PREFIX: &'static str = "cng_";

    /// Marker that starts the body of every zero address.
    pub const ZERO_MARKER: &'static str = "zero";

    /// Length of the body of a derived address (52 hash chars + 8 checksum chars).
    pub const DERIVED_BODY_LEN: usize = 60;

    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let addr = Self(raw.into());
        addr.is_valid()?;
        Ok(addr)
    }

    /// The zero address of a currency: `cng_zero` + lowercased currency id.
    pub fn zero(currency: &CurrencyId) -> Self {
        Self(format!(
            "{}{}{}",
            Self::PREFIX,
            Self::ZERO_MARKER,
            currency.as_str().to_lowercase()
        ))
    }

    /// Shape check, also run after decoding from the wire.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let Some(body) = self.0.strip_prefix(Self::PREFIX) else {
            return Err(ValidationError::InvalidAddress(
                self.0.clone(),
                "missing cng_ prefix",
            ));
        };
        let charset_ok = body
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !charset_ok {
            return Err(ValidationError::InvalidAddress(
                self.0.clone(),
                "body must be lowercase alphanumeric",
            ));
        }
        // Forms are told apart by length: a derived body is always 60 chars,
        // a zero body is at most 14 (marker + currency id).
        if body.len() == Self::DERIVED_BODY_LEN {
            return Ok(());
        }
        if let Some(marker_rest) = body.strip_prefix(Self::ZERO_MARKER) {
            let len_ok =
                (CurrencyId::MIN_LEN..=CurrencyId::MAX_LEN).contains(&marker_rest.len());
            let first_ok = marker_rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_lowercase());
            if len_ok && first_ok {
                return Ok(());
            }
        }
        Err(ValidationError::InvalidAddress(
            self.0.clone(),
            "body must be 60 characters or a zero-address form",
        ))
    }

    /// Whether this is a per-currency zero (bookkeeping) address.
    pub fn is_zero_address(&self) -> bool {
        self.0.strip_prefix(Self::PREFIX).is_some_and(|body| {
            body.len() != Self::DERIVED_BODY_LEN && body.starts_with(Self::ZERO_MARKER)
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived_body() -> String {
        "1".repeat(Address::DERIVED_BODY_LEN)
    }

    #[test]
    fn derived_shape_accepted() {
        let addr = Address::new(format!("cng_{}", derived_body())).unwrap();
        assert!(!addr.is_zero_address());
    }

    #[test]
    fn zero_address_accepted() {
        let cur = CurrencyId::new("PEN").unwrap();
        let addr = Address::zero(&cur);
        assert_eq!(addr.as_str(), "cng_zeropen");
        assert!(addr.is_valid().is_ok());
        assert!(addr.is_zero_address());
    }

    #[test]
    fn zero_address_with_digits() {
        let cur = CurrencyId::new("C2X").unwrap();
        let addr = Address::zero(&cur);
        assert_eq!(addr.as_str(), "cng_zeroc2x");
        assert!(addr.is_valid().is_ok());
    }

    #[test]
    fn missing_prefix_rejected() {
        assert!(Address::new(derived_body()).is_err());
        assert!(Address::new(format!("brst_{}", derived_body())).is_err());
    }

    #[test]
    fn wrong_body_length_rejected() {
        assert!(Address::new("cng_tooshort").is_err());
        assert!(Address::new(format!("cng_{}1", derived_body())).is_err());
    }

    #[test]
    fn uppercase_body_rejected() {
        let body = "A".repeat(Address::DERIVED_BODY_LEN);
        assert!(Address::new(format!("cng_{body}")).is_err());
    }

    #[test]
    fn malformed_zero_rejected() {
        assert!(Address::new("cng_zero").is_err());
        assert!(Address::new("cng_zero7pen").is_err());
    }
}
