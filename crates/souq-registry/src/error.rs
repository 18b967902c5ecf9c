use souq_core::RecipientRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry read failed: {0}")]
    Read(String),

    #[error("registry write failed: {0}")]
    Write(String),

    #[error("recipient not found: {0}")]
    NotFound(RecipientRef),
}

impl RegistryError {
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    pub fn not_found(recipient: RecipientRef) -> Self {
        Self::NotFound(recipient)
    }
}
