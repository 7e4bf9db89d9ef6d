//! Arbitrary-precision signed integer for monetary amounts.
//!
//! Amounts are integral (the smallest unit is 1) and unbounded, so supply
//! aggregates and fee math never overflow. Serialized as a decimal string to
//! stay lossless in both JSON and binary encodings.

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

/// An arbitrary-precision signed integer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Big(BigInt);

impl Big {
    pub fn zero() -> Self {
        Self(BigInt::from(0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigInt::from(0)
    }

    /// Strictly positive.
    pub fn over_zero(&self) -> bool {
        self.0 > BigInt::from(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigInt::from(0)
    }

    /// Canonical byte form used when hashing: two's-complement big-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_signed_bytes_be()
    }

    /// Decimal string form.
    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }
}

impl From<i64> for Big {
    fn from(v: i64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<u64> for Big {
    fn from(v: u64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<u128> for Big {
    fn from(v: u128) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<i128> for Big {
    fn from(v: i128) -> Self {
        Self(BigInt::from(v))
    }
}

impl FromStr for Big {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::from_str(s)
            .map(Self)
            .map_err(|_| ValidationError::InvalidBig(s.to_string()))
    }
}

impl Add for Big {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Add for &Big {
    type Output = Big;
    fn add(self, rhs: Self) -> Big {
        Big(&self.0 + &rhs.0)
    }
}

impl Sub for Big {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Big {
    type Output = Big;
    fn sub(self, rhs: Self) -> Big {
        Big(&self.0 - &rhs.0)
    }
}

impl Neg for Big {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<u32> for &Big {
    type Output = Big;
    fn mul(self, rhs: u32) -> Big {
        Big(&self.0 * rhs)
    }
}

impl Div<u32> for Big {
    type Output = Self;
    fn div(self, rhs: u32) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for Big {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_str_radix(10))
    }
}

impl Serialize for Big {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Big {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BigVisitor;

        impl<'de> serde::de::Visitor<'de> for BigVisitor {
            type Value = Big;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a decimal integer string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(BigVisitor)
    }
}
