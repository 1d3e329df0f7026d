//! Filesystem blob backend.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::config::FsStorageConfig;
use super::error::StoreError;
use super::traits::BlobBackend;
use super::types::PublicAccess;

const ACCESS_FILE: &str = ".access";

/// Stores objects at `<root>/<container>/<key>` and serves them from a public base URL.
pub struct FsBlobBackend {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobBackend {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &FsStorageConfig) -> Self {
        Self::new(config.root.clone(), config.public_base_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        if container.is_empty() || !is_plain_segment(container) {
            return Err(StoreError::InvalidKey {
                key: container.to_string(),
            });
        }
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.container_dir(container)?;
        if key.is_empty() || key == ACCESS_FILE {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        for segment in key.split('/') {
            if segment.is_empty() || !is_plain_segment(segment) {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }

    async fn require_container(&self, container: &str) -> Result<PathBuf, StoreError> {
        let dir = self.container_dir(container)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StoreError::ContainerMissing {
                container: container.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::ContainerMissing {
                container: container.to_string(),
            }),
            Err(e) => Err(StoreError::io(dir, e)),
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['/', '\\', '\0'])
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn ensure_container(&self, container: &str) -> Result<bool, StoreError> {
        let dir = self.container_dir(container)?;
        if fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(false);
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;
        Ok(true)
    }

    async fn public_access(&self, container: &str) -> Result<PublicAccess, StoreError> {
        let dir = self.require_container(container).await?;
        let path = dir.join(ACCESS_FILE);
        match fs::read_to_string(&path).await {
            Ok(contents) => contents.parse().map_err(StoreError::Backend),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PublicAccess::Private),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn set_public_access(
        &self,
        container: &str,
        access: PublicAccess,
    ) -> Result<(), StoreError> {
        let dir = self.require_container(container).await?;
        let path = dir.join(ACCESS_FILE);
        fs::write(&path, access.as_str())
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError> {
        let path = self.object_path(container, key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        self.require_container(container).await?;
        let path = self.object_path(container, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let checksum = format!("{:x}", Sha256::digest(&bytes));

        // Write beside the target and rename so readers never see a partial object.
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        let written = match fs::write(&temp_path, &bytes).await {
            Ok(()) => fs::rename(&temp_path, &path)
                .await
                .map_err(|e| StoreError::io(&path, e)),
            Err(e) => Err(StoreError::io(&temp_path, e)),
        };
        if let Err(e) = written {
            // A partial write can leave the temp file behind too.
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!(container, key, size = bytes.len(), sha256 = %checksum, "Stored object");
        Ok(checksum)
    }

    fn public_url(&self, container: &str, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            urlencoding::encode(container),
            encoded
        )
    }
}
