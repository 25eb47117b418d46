use thiserror::Error;

/// Error type that captures common ledger failures.
///
/// Every variant is user-correctable; validation always runs before any
/// balance mutation, so a failed operation leaves prior state untouched.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: f64, available: f64 },
    #[error("Transfer source and destination are the same")]
    SameSource,
    #[error("Import failed: {0}")]
    ImportParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
