//! Error types for the store module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to object storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Container does not exist.
    #[error("Container not found: {container}")]
    ContainerMissing { container: String },

    /// Key would escape its container.
    #[error("Invalid object key: {key:?}")]
    InvalidKey { key: String },
}

impl StoreError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Backend(_))
    }
}
