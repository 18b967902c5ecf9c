use thiserror::Error;

/// Core error types for Souq domain operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid recipient kind: {0}")]
    InvalidRecipientKind(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),
}

impl CoreError {
    /// Create a new InvalidRecipientKind error
    pub fn invalid_recipient_kind(kind: impl Into<String>) -> Self {
        Self::InvalidRecipientKind(kind.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
