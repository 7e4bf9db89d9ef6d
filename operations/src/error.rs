use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("fact hash does not match fact contents")]
    FactHashMismatch,

    #[error("operation hash does not match fact and signatures")]
    OperationHashMismatch,

    #[error("operation carries no signatures")]
    NoSignatures,

    #[error("duplicate signer: {0}")]
    DuplicateSigner(String),

    #[error("invalid signature by {0}")]
    InvalidSignature(String),

    #[error("fact has no items")]
    EmptyItems,

    #[error("too many items: {len}, at most {max}")]
    TooManyItems { len: usize, max: usize },

    #[error("item has no amounts")]
    EmptyAmounts,

    #[error("too many amounts in one item: {len}, at most {max}")]
    TooManyAmounts { len: usize, max: usize },

    #[error("duplicate currency in one item: {0}")]
    DuplicateCurrency(String),

    #[error("duplicate address across items: {0}")]
    DuplicateAddress(String),

    #[error("{0} must be different from the sender")]
    SameAsSender(String),

    #[error("genesis account of design {0} does not match the key set")]
    GenesisAccountMismatch(String),

    #[error("no currencies listed")]
    EmptyCurrencies,

    #[error("validation error: {0}")]
    Validation(#[from] coinage_types::ValidationError),

    #[error("currency error: {0}")]
    Currency(#[from] coinage_currency::CurrencyError),
}
