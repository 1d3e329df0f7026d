//! Configuration for the cache module.

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Configuration for the asset cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Retry policy for retryable fetch failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl CacheConfig {
    /// Sets the fetch retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
