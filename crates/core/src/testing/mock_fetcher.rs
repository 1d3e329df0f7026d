//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::parse_absolute_url;
use crate::fetcher::{AssetFetcher, FetchError};

#[derive(Debug, Clone)]
enum MockResponse {
    Body(Vec<u8>),
    Status(u16),
}

/// Mock implementation of the AssetFetcher trait.
///
/// Provides controllable behavior for testing:
/// - Canned bodies or HTTP status failures per URL
/// - Optional default body for unknown URLs (404 otherwise)
/// - Simulated latency
/// - Records every URL that reached the "network"
///
/// # Example
///
/// ```rust,ignore
/// use reelsync_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_response("http://x/a.jpg", jpeg_bytes(10, 10)).await;
///
/// // ... run a sync ...
///
/// assert_eq!(fetcher.request_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    /// Canned responses by URL.
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    /// Body returned for URLs without a canned response.
    default_body: Arc<RwLock<Option<Vec<u8>>>>,
    /// URLs requested, in order.
    requests: Arc<RwLock<Vec<String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Simulated latency.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            default_body: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Serve `body` for `url`.
    pub async fn set_response(&self, url: &str, body: Vec<u8>) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Body(body));
    }

    /// Fail every fetch of `url` with an HTTP status.
    pub async fn set_status(&self, url: &str, status: u16) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Status(status));
    }

    /// Serve `body` for every URL without a canned response.
    pub async fn set_default_response(&self, body: Vec<u8>) {
        *self.default_body.write().await = Some(body);
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all requested URLs.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Get the number of requests performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded_requests(&self) {
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if parse_absolute_url(url).is_none() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        self.requests.write().await.push(url.to_string());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let response = self.responses.read().await.get(url).cloned();
        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => match self.default_body.read().await.clone() {
                Some(body) => Ok(body),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            },
        }
    }
}
