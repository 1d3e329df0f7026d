//! Configuration for the sync module.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogKind;
use crate::retry::RetryConfig;

/// What to write for an asset whose caching failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFailurePolicy {
    /// Write an empty URL.
    #[default]
    Clear,
    /// Leave the field out of the update so a stored URL survives.
    KeepPrevious,
}

/// Configuration for catalog syncing and the sync runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Catalogs synced by each run, in order.
    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<CatalogKind>,

    /// Re-fetch and re-upload assets even when already stored.
    #[serde(default)]
    pub force_replace: bool,

    /// Handling of failed assets.
    #[serde(default)]
    pub asset_failure_policy: AssetFailurePolicy,

    /// Documents processed concurrently within a batch.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_documents: usize,

    /// Seconds between scheduled runs (0 disables the schedule).
    #[serde(default)]
    pub interval_secs: u64,

    /// Run once as soon as the runner starts.
    #[serde(default = "default_true")]
    pub run_on_start: bool,

    /// Retry policy for retryable upsert failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_catalogs() -> Vec<CatalogKind> {
    CatalogKind::ALL.to_vec()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            catalogs: default_catalogs(),
            force_replace: false,
            asset_failure_policy: AssetFailurePolicy::default(),
            max_concurrent_documents: default_max_concurrent(),
            interval_secs: 0,
            run_on_start: true,
            retry: RetryConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Sets the catalogs to sync.
    pub fn with_catalogs(mut self, catalogs: Vec<CatalogKind>) -> Self {
        self.catalogs = catalogs;
        self
    }

    /// Enables forced asset replacement.
    pub fn with_force_replace(mut self, enabled: bool) -> Self {
        self.force_replace = enabled;
        self
    }

    /// Sets the failed-asset policy.
    pub fn with_asset_failure_policy(mut self, policy: AssetFailurePolicy) -> Self {
        self.asset_failure_policy = policy;
        self
    }

    /// Sets the document concurrency.
    pub fn with_max_concurrent_documents(mut self, max: usize) -> Self {
        self.max_concurrent_documents = max;
        self
    }

    /// Sets the schedule interval.
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Enables or disables the initial run.
    pub fn with_run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }
}
