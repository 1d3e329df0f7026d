use std::path::PathBuf;
use std::sync::Arc;

use reelsync_core::{Config, SanitizedConfig, StorageBackend, SyncRunner, TargetStore};

/// Shared application state
pub struct AppState {
    config: Config,
    runner: Arc<SyncRunner>,
    target: Arc<dyn TargetStore>,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<SyncRunner>, target: Arc<dyn TargetStore>) -> Self {
        Self {
            config,
            runner,
            target,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn runner(&self) -> &SyncRunner {
        &self.runner
    }

    pub fn target(&self) -> &dyn TargetStore {
        self.target.as_ref()
    }

    /// API key required for mutating routes, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.config
            .server
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }

    /// Blob root to serve under `/assets`, if enabled.
    pub fn asset_root(&self) -> Option<PathBuf> {
        match self.config.storage.backend {
            StorageBackend::Filesystem if self.config.server.serve_assets => {
                Some(self.config.storage.filesystem.root.clone())
            }
            _ => None,
        }
    }
}
