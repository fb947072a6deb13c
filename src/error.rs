use thiserror::Error;

use crate::providers::types::ProviderError;

/// Every failure the core reports to its caller. None of them is fatal to
/// the process.
#[derive(Debug, Error)]
pub enum NovaError {
    /// Bad input or an unknown id. Never leaves the store modified.
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("A message is already being sent")]
    Busy,

    #[error("API error (HTTP {status_code}): {message}")]
    Api { status_code: u16, message: String },

    #[error("Transport error: {cause}")]
    Transport { cause: String },

    #[error("Failed to persist conversations: {0}")]
    Persistence(String),

    #[error("Failed to migrate legacy chats: {0}")]
    Migration(String),

    #[error("Send cancelled")]
    Cancelled,
}

impl NovaError {
    pub fn validation(msg: impl Into<String>) -> Self {
        NovaError::Validation(msg.into())
    }
}

impl From<ProviderError> for NovaError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api {
                status_code,
                message,
            } => NovaError::Api {
                status_code,
                message,
            },
            ProviderError::Transport(cause) => NovaError::Transport { cause },
            ProviderError::InvalidResponse(cause) => NovaError::Transport { cause },
        }
    }
}

pub type NovaResult<T> = std::result::Result<T, NovaError>;
