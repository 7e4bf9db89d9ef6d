//! A monetary amount in a specific currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::big::Big;
use crate::currency::CurrencyId;
use crate::error::ValidationError;

/// An amount of a single currency.
///
/// The value itself may be zero or negative in intermediate arithmetic;
/// operations that require positivity check it explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub big: Big,
    pub currency: CurrencyId,
}

impl Amount {
    pub fn new(big: Big, currency: CurrencyId) -> Self {
        Self { big, currency }
    }

    pub fn zero(currency: CurrencyId) -> Self {
        Self::new(Big::zero(), currency)
    }

    /// Canonical byte form used when hashing facts.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = self.big.to_bytes();
        b.extend_from_slice(self.currency.as_bytes());
        b
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.currency.is_valid()?;
        if self.big.is_negative() {
            return Err(ValidationError::Negative { field: "amount" });
        }
        Ok(())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.currency, self.big)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    /// Parse the `CURRENCY:VALUE` form used on the command line, e.g. `PEN:100`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cur, val) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::Other(format!("expected CURRENCY:VALUE, got {s:?}")))?;
        let amount = Self::new(val.parse()?, cur.parse()?);
        amount.is_valid()?;
        Ok(amount)
    }
}
