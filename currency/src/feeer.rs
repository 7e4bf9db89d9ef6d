//! Fee policies attached to a currency.

use serde::{Deserialize, Serialize};

use coinage_types::{Address, Big, ValidationError};

use crate::error::CurrencyError;

/// How fees are computed for operations denominated in a currency.
///
/// Ratios are expressed in basis points (1 bps = 0.01%), so fee math stays
/// in integers and truncates toward zero exactly like the supply math.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeer {
    /// No fees, ever.
    Nil,
    /// A flat fee per transfer-like item, independent of the moved amount.
    Fixed {
        receiver: Option<Address>,
        amount: Big,
        exchange_min: Big,
    },
    /// A proportional fee, bounded below by `min` and above by `max`
    /// (`None` = unbounded).
    Ratio {
        receiver: Option<Address>,
        /// Basis points, at most [`Feeer::RATIO_DENOMINATOR`].
        ratio: u32,
        min: Big,
        max: Option<Big>,
        exchange_min: Big,
    },
}

impl Feeer {
    /// 10000 bps = 100%.
    pub const RATIO_DENOMINATOR: u32 = 10_000;

    /// Compute the fee for moving `amount`.
    ///
    /// The branches are ordered deliberately and the zero-handling of Fixed
    /// and Ratio is asymmetric on purpose: a zero Fixed fee configuration
    /// never charges, while a non-zero Ratio charges at least `min` even for
    /// a zero amount.
    pub fn fee(&self, amount: &Big) -> Big {
        match self {
            Self::Nil => Big::zero(),
            Self::Fixed { amount: fee, .. } => {
                if fee.is_zero() {
                    Big::zero()
                } else {
                    fee.clone()
                }
            }
            Self::Ratio {
                ratio, min, max, ..
            } => {
                if *ratio == 0 {
                    return Big::zero();
                }
                if amount.is_zero() {
                    return min.clone();
                }
                if *ratio == Self::RATIO_DENOMINATOR {
                    // Full ratio passes the amount through without bounding.
                    return amount.clone();
                }
                let f = amount * *ratio / Self::RATIO_DENOMINATOR;
                if &f < min {
                    return min.clone();
                }
                if let Some(max) = max {
                    if &f > max {
                        return max.clone();
                    }
                }
                f
            }
        }
    }

    /// The account fees are credited to, when the policy names one.
    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Self::Nil => None,
            Self::Fixed { receiver, .. } | Self::Ratio { receiver, .. } => receiver.as_ref(),
        }
    }

    pub fn is_valid(&self) -> Result<(), CurrencyError> {
        match self {
            Self::Nil => Ok(()),
            Self::Fixed {
                receiver,
                amount,
                exchange_min,
            } => {
                if let Some(receiver) = receiver {
                    receiver.is_valid()?;
                }
                if amount.is_negative() {
                    return Err(ValidationError::Negative { field: "fee amount" }.into());
                }
                if exchange_min.is_negative() {
                    return Err(ValidationError::Negative {
                        field: "exchange min",
                    }
                    .into());
                }
                Ok(())
            }
            Self::Ratio {
                receiver,
                ratio,
                min,
                max,
                exchange_min,
            } => {
                if let Some(receiver) = receiver {
                    receiver.is_valid()?;
                }
                if *ratio > Self::RATIO_DENOMINATOR {
                    return Err(CurrencyError::InvalidRatio(*ratio));
                }
                if min.is_negative() {
                    return Err(ValidationError::Negative { field: "fee min" }.into());
                }
                if exchange_min.is_negative() {
                    return Err(ValidationError::Negative {
                        field: "exchange min",
                    }
                    .into());
                }
                if let Some(max) = max {
                    if max < min {
                        return Err(CurrencyError::MaxBelowMin);
                    }
                }
                Ok(())
            }
        }
    }

    /// Canonical byte form used when hashing a design that embeds this policy.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Nil => vec![0],
            Self::Fixed {
                receiver,
                amount,
                exchange_min,
            } => {
                let mut b = vec![1];
                if let Some(receiver) = receiver {
                    b.extend_from_slice(receiver.as_bytes());
                }
                b.extend_from_slice(&amount.to_bytes());
                b.extend_from_slice(&exchange_min.to_bytes());
                b
            }
            Self::Ratio {
                receiver,
                ratio,
                min,
                max,
                exchange_min,
            } => {
                let mut b = vec![2];
                if let Some(receiver) = receiver {
                    b.extend_from_slice(receiver.as_bytes());
                }
                b.extend_from_slice(&ratio.to_be_bytes());
                b.extend_from_slice(&min.to_bytes());
                if let Some(max) = max {
                    b.extend_from_slice(&max.to_bytes());
                }
                b.extend_from_slice(&exchange_min.to_bytes());
                b
            }
        }
    }
}
