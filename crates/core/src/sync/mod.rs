//! Sync module importing catalog batches into the target store.
//!
//! A [`CatalogSyncer`] walks each source document through
//! `Start → Deserialized → AssetsCached → Upserted → Done`. Image URLs are
//! mirrored through the [`AssetCache`](crate::cache::AssetCache) and the
//! record is written with one atomic upsert keyed on its natural key.
//!
//! # Features
//!
//! - Bounded document concurrency with reports kept in input order
//! - Per-document failure isolation: a bad document never aborts the batch
//! - Configurable handling of failed assets ([`AssetFailurePolicy`])
//! - Retries for retryable upsert failures
//!
//! # Example
//!
//! ```ignore
//! use reelsync_core::sync::{CatalogSyncer, SyncConfig};
//!
//! let syncer = CatalogSyncer::new(CatalogKind::Animes, cache, target, telemetry, SyncConfig::default());
//! let report = syncer.import(documents).await;
//! println!("{}", report.summary());
//! ```

mod config;
mod error;
mod syncer;
mod types;

pub use config::{AssetFailurePolicy, SyncConfig};
pub use error::SyncError;
pub use syncer::CatalogSyncer;
pub use types::{
    AssetReport, AssetStatus, AssetTally, DocumentReport, DocumentResult, DocumentStage,
    SyncReport,
};
