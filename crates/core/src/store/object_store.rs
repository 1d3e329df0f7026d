//! Provisioned, scoped view of a blob container.

use std::sync::Arc;
use tracing::info;

use super::error::StoreError;
use super::traits::BlobBackend;
use super::types::{PublicAccess, StoredObject};
use crate::catalog::AssetKey;

/// Provisions a container and hands out an [`ObjectStore`] for it.
pub struct ObjectStoreBuilder {
    backend: Arc<dyn BlobBackend>,
    container: String,
}

impl ObjectStoreBuilder {
    pub fn new(backend: Arc<dyn BlobBackend>, container: impl Into<String>) -> Self {
        Self {
            backend,
            container: container.into(),
        }
    }

    /// Creates the container if missing and grants anonymous blob reads.
    pub async fn provision(self) -> Result<ObjectStore, StoreError> {
        let created = self.backend.ensure_container(&self.container).await?;

        let access = self.backend.public_access(&self.container).await?;
        if access != PublicAccess::Blob {
            self.backend
                .set_public_access(&self.container, PublicAccess::Blob)
                .await?;
        }

        info!(
            backend = self.backend.name(),
            container = %self.container,
            created,
            previous_access = %access,
            "Object store provisioned"
        );

        Ok(ObjectStore {
            backend: self.backend,
            container: self.container,
            prefix: String::new(),
        })
    }
}

/// Handle to a provisioned container, optionally scoped under a key prefix.
#[derive(Clone)]
pub struct ObjectStore {
    backend: Arc<dyn BlobBackend>,
    container: String,
    prefix: String,
}

impl ObjectStore {
    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a store whose keys live under `prefix/`.
    pub fn scoped(&self, prefix: &str) -> ObjectStore {
        let prefix = prefix.trim_matches('/');
        let prefix = if self.prefix.is_empty() {
            prefix.to_string()
        } else if prefix.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix, prefix)
        };

        ObjectStore {
            backend: Arc::clone(&self.backend),
            container: self.container.clone(),
            prefix,
        }
    }

    /// Full key of `key` inside the container.
    pub fn full_key(&self, key: &AssetKey) -> String {
        if self.prefix.is_empty() {
            key.as_str().to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }

    pub async fn exists(&self, key: &AssetKey) -> Result<bool, StoreError> {
        self.backend
            .exists(&self.container, &self.full_key(key))
            .await
    }

    /// Uploads `bytes` under `key`, replacing any previous object.
    pub async fn upload(&self, key: &AssetKey, bytes: Vec<u8>) -> Result<StoredObject, StoreError> {
        let full_key = self.full_key(key);
        let size_bytes = bytes.len() as u64;
        let sha256 = self.backend.put(&self.container, &full_key, bytes).await?;
        let url = self.backend.public_url(&self.container, &full_key);

        Ok(StoredObject {
            key: full_key,
            url,
            size_bytes,
            sha256,
        })
    }

    pub fn public_url(&self, key: &AssetKey) -> String {
        self.backend.public_url(&self.container, &self.full_key(key))
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("backend", &self.backend.name())
            .field("container", &self.container)
            .field("prefix", &self.prefix)
            .finish()
    }
}
