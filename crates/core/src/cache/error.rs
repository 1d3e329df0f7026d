//! Error types for the cache module.

use thiserror::Error;

use crate::fetcher::FetchError;
use crate::store::StoreError;

/// Errors that can occur while caching one asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Source could not be fetched.
    #[error("Failed to fetch asset {key}")]
    Fetch {
        key: String,
        #[source]
        source: FetchError,
    },

    /// Existence check or upload failed.
    #[error("Failed to store asset {key}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl AssetError {
    /// Key of the asset that failed.
    pub fn key(&self) -> &str {
        match self {
            Self::Fetch { key, .. } | Self::Store { key, .. } => key,
        }
    }

    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_retryable(),
            Self::Store { source, .. } => source.is_retryable(),
        }
    }
}
