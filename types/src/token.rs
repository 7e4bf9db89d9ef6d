//! Fact token — per-fact salt distinguishing otherwise identical intents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::ValidationError;

/// Opaque byte token carried by every fact.
///
/// Two facts with the same payload but different tokens hash differently,
/// so resubmitting an intent never collides with the original.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(Vec<u8>);

impl Token {
    pub const MAX_LEN: usize = 100;

    pub fn new(bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let token = Self(bytes);
        token.is_valid()?;
        Ok(token)
    }

    /// Build from a UTF-8 string, the usual command-line form.
    pub fn from_text(s: &str) -> Result<Self, ValidationError> {
        Self::new(s.as_bytes().to_vec())
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        if self.0.len() > Self::MAX_LEN {
            return Err(ValidationError::TokenTooLong {
                len: self.0.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TokenVisitor;

        impl<'de> serde::de::Visitor<'de> for TokenVisitor {
            type Value = Token;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a hex string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                let bytes = hex::decode(v)
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))?;
                Ok(Token(bytes))
            }
        }

        deserializer.deserialize_str(TokenVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rejected() {
        assert!(Token::new(vec![]).is_err());
    }

    #[test]
    fn too_long_rejected() {
        assert!(Token::new(vec![0u8; 101]).is_err());
        assert!(Token::new(vec![0u8; 100]).is_ok());
    }

    #[test]
    fn from_text() {
        let t = Token::from_text("2026-01-01T00:00:00Z").unwrap();
        assert_eq!(t.as_bytes(), b"2026-01-01T00:00:00Z");
    }
}
