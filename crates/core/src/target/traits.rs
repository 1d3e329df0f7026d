//! Trait definitions for the target module.

use async_trait::async_trait;
use serde_json::Value;

use super::error::UpsertError;
use super::types::{FieldSet, KeyFilter, UpsertOutcome};

/// Document store receiving synced records.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Atomically inserts the document matching `filter` if absent, then
    /// overwrites the paths named in `fields`.
    async fn find_one_and_upsert(
        &self,
        collection: &str,
        filter: &KeyFilter,
        fields: &FieldSet,
    ) -> Result<UpsertOutcome, UpsertError>;

    /// Returns the document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: &str,
        filter: &KeyFilter,
    ) -> Result<Option<Value>, UpsertError>;

    /// Number of documents in `collection`.
    async fn count(&self, collection: &str) -> Result<u64, UpsertError>;
}
