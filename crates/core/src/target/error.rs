//! Error types for the target module.

use thiserror::Error;

/// Errors that can occur while writing to the target store.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Document body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The connection lock was poisoned.
    #[error("Lock error: {0}")]
    Lock(String),
}

impl UpsertError {
    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<rusqlite::Error> for UpsertError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
