//! Currency identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Identifies a registered currency, e.g. `"PEN"` or `"MCC"`.
///
/// 3 to 10 characters, uppercase alphanumeric, first character a letter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(String);

impl CurrencyId {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 10;

    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let id = Self(raw.into());
        id.is_valid()?;
        Ok(id)
    }

    /// Shape check, also run after decoding from the wire.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let s = &self.0;
        let len_ok = (Self::MIN_LEN..=Self::MAX_LEN).contains(&s.len());
        let first_ok = s.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let rest_ok = s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if len_ok && first_ok && rest_ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidCurrencyId(s.clone()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for CurrencyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
