//! Configuration for the target module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// SQLite database file.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("reelsync.db")
}
