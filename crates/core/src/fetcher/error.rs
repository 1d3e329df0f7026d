//! Error types for the fetcher module.

use thiserror::Error;

/// Errors that can occur while fetching an asset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is relative, malformed or has no host.
    #[error("Invalid asset URL: {url:?}")]
    InvalidUrl { url: String },

    /// URL scheme is not http or https.
    #[error("Unsupported URL scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    /// Request did not complete within the configured timeout.
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Transport-level failure.
    #[error("HTTP request failed for {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Fetcher could not be built from its configuration.
    #[error("Fetcher configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    /// Classifies a reqwest error for `url`.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Http { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl { .. } | Self::UnsupportedScheme { .. } | Self::Configuration(_) => {
                false
            }
        }
    }
}
