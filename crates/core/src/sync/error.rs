//! Error types for the sync module.

use thiserror::Error;

use crate::catalog::DeserializeError;
use crate::target::UpsertError;

/// Per-document failure. Never aborts the batch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source document could not be turned into a record.
    #[error("Document #{index} could not be deserialized")]
    Deserialize {
        index: usize,
        #[source]
        source: DeserializeError,
    },

    /// Target store rejected the write.
    #[error("Upsert of {collection} {key} failed")]
    Upsert {
        collection: &'static str,
        key: String,
        #[source]
        source: UpsertError,
    },
}
