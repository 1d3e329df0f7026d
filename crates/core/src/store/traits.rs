//! Trait definitions for the store module.

use async_trait::async_trait;

use super::error::StoreError;
use super::types::PublicAccess;

/// Raw blob container operations.
///
/// Consumers go through [`ObjectStore`](super::ObjectStore), which can only be
/// obtained once the container has been provisioned.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Returns the name of this backend implementation.
    fn name(&self) -> &str;

    /// Creates `container` if it does not exist. Returns true if it was created.
    async fn ensure_container(&self, container: &str) -> Result<bool, StoreError>;

    /// Current anonymous access level of `container`.
    async fn public_access(&self, container: &str) -> Result<PublicAccess, StoreError>;

    /// Changes the anonymous access level of `container`.
    async fn set_public_access(
        &self,
        container: &str,
        access: PublicAccess,
    ) -> Result<(), StoreError>;

    /// Whether an object exists under `key`.
    async fn exists(&self, container: &str, key: &str) -> Result<bool, StoreError>;

    /// Stores `bytes` under `key`, replacing any previous object.
    ///
    /// Returns the SHA-256 of the stored bytes, hex encoded.
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    /// Public URL for `key`. Does not check existence.
    fn public_url(&self, container: &str, key: &str) -> String;
}
