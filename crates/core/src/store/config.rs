//! Configuration for the store module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Available object storage backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Filesystem,
}

/// Object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Container holding every mirrored asset.
    #[serde(default = "default_container")]
    pub container: String,

    /// Filesystem backend settings.
    #[serde(default)]
    pub filesystem: FsStorageConfig,
}

/// Filesystem backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsStorageConfig {
    /// Directory containing one sub-directory per container.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Base URL under which `root` is publicly served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_container() -> String {
    "assets".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("data/blobs")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/assets".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            container: default_container(),
            filesystem: FsStorageConfig::default(),
        }
    }
}

impl Default for FsStorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Filesystem);
        assert_eq!(config.container, "assets");
        assert_eq!(config.filesystem.root, PathBuf::from("data/blobs"));
    }
}
