use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoyaltyError {
    #[error("Invalid tier specification '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("No right configured for category '{category}'")]
    UnknownRight { category: String },

    #[error("Cannot return {requested} copies: only {available} sold to date")]
    InvalidReturn { requested: u64, available: u64 },

    #[error("Tier {tier} is full and no further tier exists")]
    CapacityExhausted { tier: usize },

    #[error("Arithmetic overflow while {context}")]
    Overflow { context: String },

    #[error("Statement price must be positive, got {price}")]
    InvalidPrice { price: Decimal },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoyaltyError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input:  input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type RoyaltyResult<T> = Result<T, RoyaltyError>;
