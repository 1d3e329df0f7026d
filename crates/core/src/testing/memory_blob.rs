//! In-memory blob backend for testing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::{BlobBackend, PublicAccess, StoreError};

#[derive(Debug, Default, Clone)]
struct Container {
    access: PublicAccess,
    objects: HashMap<String, Vec<u8>>,
}

/// In-memory implementation of the BlobBackend trait.
///
/// Records puts, existence checks and access changes for assertions.
/// Public URLs look like `https://blobs.test/<container>/<key>`.
#[derive(Debug)]
pub struct MemoryBlobBackend {
    containers: Arc<RwLock<HashMap<String, Container>>>,
    /// Keys passed to `put`, in order.
    puts: Arc<RwLock<Vec<String>>>,
    /// Number of `exists` calls.
    exists_calls: Arc<RwLock<usize>>,
    /// Number of `set_public_access` calls.
    access_changes: Arc<RwLock<usize>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<StoreError>>>,
}

impl Default for MemoryBlobBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            containers: Arc::new(RwLock::new(HashMap::new())),
            puts: Arc::new(RwLock::new(Vec::new())),
            exists_calls: Arc::new(RwLock::new(0)),
            access_changes: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Whether `container` exists.
    pub async fn has_container(&self, container: &str) -> bool {
        self.containers.read().await.contains_key(container)
    }

    /// Bytes stored under `key`, if any.
    pub async fn object(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.containers
            .read()
            .await
            .get(container)
            .and_then(|c| c.objects.get(key).cloned())
    }

    /// Number of objects in `container`.
    pub async fn object_count(&self, container: &str) -> usize {
        self.containers
            .read()
            .await
            .get(container)
            .map(|c| c.objects.len())
            .unwrap_or(0)
    }

    /// Get all keys that were written.
    pub async fn recorded_puts(&self) -> Vec<String> {
        self.puts.read().await.clone()
    }

    /// Get the number of writes performed.
    pub async fn put_count(&self) -> usize {
        self.puts.read().await.len()
    }

    /// Get the number of existence checks performed.
    pub async fn exists_count(&self) -> usize {
        *self.exists_calls.read().await
    }

    /// Get the number of access level changes.
    pub async fn access_changes(&self) -> usize {
        *self.access_changes.read().await
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Result<(), StoreError> {
        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn missing(container: &str) -> StoreError {
        StoreError::ContainerMissing {
            container: container.to_string(),
        }
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ensure_container(&self, container: &str) -> Result<bool, StoreError> {
        self.take_error().await?;
        let mut containers = self.containers.write().await;
        if containers.contains_key(container) {
            return Ok(false);
        }
        containers.insert(container.to_string(), Container::default());
        Ok(true)
    }

    async fn public_access(&self, container: &str) -> Result<PublicAccess, StoreError> {
        self.take_error().await?;
        self.containers
            .read()
            .await
            .get(container)
            .map(|c| c.access)
            .ok_or_else(|| Self::missing(container))
    }

    async fn set_public_access(
        &self,
        container: &str,
        access: PublicAccess,
    ) -> Result<(), StoreError> {
        self.take_error().await?;
        let mut containers = self.containers.write().await;
        let entry = containers
            .get_mut(container)
            .ok_or_else(|| Self::missing(container))?;
        entry.access = access;
        *self.access_changes.write().await += 1;
        Ok(())
    }

    async fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError> {
        *self.exists_calls.write().await += 1;
        self.take_error().await?;
        let containers = self.containers.read().await;
        let entry = containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        Ok(entry.objects.contains_key(key))
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        self.take_error().await?;
        let checksum = format!("{:x}", Sha256::digest(&bytes));
        {
            let mut containers = self.containers.write().await;
            let entry = containers
                .get_mut(container)
                .ok_or_else(|| Self::missing(container))?;
            entry.objects.insert(key.to_string(), bytes);
        }
        self.puts.write().await.push(key.to_string());
        Ok(checksum)
    }

    fn public_url(&self, container: &str, key: &str) -> String {
        format!("https://blobs.test/{}/{}", container, key)
    }
}
