use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Loan already exists: {0}")]
    DuplicateLoan(String),

    #[error("Loan store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SentinelError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SentinelError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(e: serde_json::Error) -> Self {
        SentinelError::SerializationError(e.to_string())
    }
}
