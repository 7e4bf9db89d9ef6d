//! Currency registration operation: put a new currency design on the ledger.

use serde::{Deserialize, Serialize};

use coinage_currency::CurrencyDesign;
use coinage_types::{Hash, Token};

use crate::error::OperationError;
use crate::fact::Fact;
use crate::OpKind;

/// Intent to register the embedded design as a new currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRegisterFact {
    token: Token,
    pub design: CurrencyDesign,
    hash: Hash,
}

impl CurrencyRegisterFact {
    pub fn new(token: Token, design: CurrencyDesign) -> Self {
        let mut fact = Self {
            token,
            design,
            hash: Hash::ZERO,
        };
        fact.hash = fact.compute_hash();
        fact
    }
}

impl Fact for CurrencyRegisterFact {
    fn kind(&self) -> OpKind {
        OpKind::CurrencyRegister
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut b = self.token.as_bytes().to_vec();
        b.extend_from_slice(&self.design.to_bytes());
        b
    }

    fn is_valid(&self) -> Result<(), OperationError> {
        if self.compute_hash() != self.hash {
            return Err(OperationError::FactHashMismatch);
        }
        self.token.is_valid()?;
        self.design.is_valid()?;
        Ok(())
    }
}
