//! Trait definitions for the fetcher module.

use async_trait::async_trait;

use super::error::FetchError;

/// Resolves an absolute URL to the bytes it serves.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches the full body at `url`.
    ///
    /// Implementations make at most one request and never retry.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
