//! Types for the cache module.

use serde::{Deserialize, Serialize};

/// What to do for an asset key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDecision {
    /// The stored object is served as is.
    Reuse,
    /// The source is fetched and uploaded.
    Fetch,
}

impl CacheDecision {
    pub fn decide(force_replace: bool, exists: bool) -> Self {
        if force_replace || !exists {
            Self::Fetch
        } else {
            Self::Reuse
        }
    }
}

/// Result of caching one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssetOutcome {
    /// Source URL was empty or not absolute.
    Absent,
    /// The object already existed.
    Reused { url: String },
    /// The object was fetched and uploaded.
    Uploaded { url: String, transformed: bool },
}

impl AssetOutcome {
    /// Public URL of the asset, or `""` when absent.
    pub fn url(&self) -> &str {
        match self {
            Self::Absent => "",
            Self::Reused { url } | Self::Uploaded { url, .. } => url,
        }
    }

    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Reused { .. } => "reused",
            Self::Uploaded { .. } => "uploaded",
        }
    }
}
