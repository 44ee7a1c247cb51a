//! Error types for the typing session core.

use thiserror::Error;

/// Errors that stop a session from being configured or started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Empty word bank, zero duration, unknown bank name, unreadable custom bank.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl SessionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors raised by a key-value persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value could not be (de)serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
