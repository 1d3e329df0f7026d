//! Types for the sync module.

use serde::{Deserialize, Serialize};

use crate::cache::AssetOutcome;
use crate::catalog::{AssetKind, CatalogKind, ImageSet};
use crate::target::UpsertOutcome;

/// Lifecycle stage of a document within a batch.
///
/// Stages only move forward; a failed document reports the last stage it
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    Start,
    Deserialized,
    AssetsCached,
    Upserted,
    Done,
}

impl DocumentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Deserialized => "deserialized",
            Self::AssetsCached => "assets_cached",
            Self::Upserted => "upserted",
            Self::Done => "done",
        }
    }

    /// The stage after this one, `None` once done.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Deserialized),
            Self::Deserialized => Some(Self::AssetsCached),
            Self::AssetsCached => Some(Self::Upserted),
            Self::Upserted => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Outcome of one asset slot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    Absent,
    Reused,
    Uploaded { transformed: bool },
    Failed { error: String },
}

/// Report for one asset slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReport {
    pub kind: AssetKind,
    #[serde(flatten)]
    pub status: AssetStatus,
    /// URL written to the target, `None` when the field was left untouched.
    pub url: Option<String>,
}

impl AssetReport {
    pub(crate) fn from_outcome(kind: AssetKind, outcome: &AssetOutcome) -> Self {
        let status = match outcome {
            AssetOutcome::Absent => AssetStatus::Absent,
            AssetOutcome::Reused { .. } => AssetStatus::Reused,
            AssetOutcome::Uploaded { transformed, .. } => AssetStatus::Uploaded {
                transformed: *transformed,
            },
        };
        Self {
            kind,
            status,
            url: Some(outcome.url().to_string()),
        }
    }
}

/// Final result of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DocumentResult {
    Synced { upsert: UpsertOutcome },
    Failed { stage: DocumentStage, error: String },
}

/// Report for one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Position in the source batch.
    pub index: usize,
    /// Natural key, when the document got far enough to have one.
    pub key: Option<String>,
    #[serde(flatten)]
    pub result: DocumentResult,
    pub assets: Vec<AssetReport>,
    /// Image set after URL rewriting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageSet>,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        matches!(self.result, DocumentResult::Synced { .. })
    }
}

/// Asset counts across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTally {
    pub absent: usize,
    pub reused: usize,
    /// Includes transformed uploads.
    pub uploaded: usize,
    pub transformed: usize,
    pub failed: usize,
}

impl AssetTally {
    pub(crate) fn record(&mut self, status: &AssetStatus) {
        match status {
            AssetStatus::Absent => self.absent += 1,
            AssetStatus::Reused => self.reused += 1,
            AssetStatus::Uploaded { transformed } => {
                self.uploaded += 1;
                if *transformed {
                    self.transformed += 1;
                }
            }
            AssetStatus::Failed { .. } => self.failed += 1,
        }
    }
}

/// Report for a whole catalog batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub catalog: CatalogKind,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub assets: AssetTally,
    pub elapsed_ms: u64,
    /// Per-document reports in source order. Only failed documents are
    /// kept in a [`SyncReport::failures_only`] copy.
    pub documents: Vec<DocumentReport>,
}

impl SyncReport {
    pub(crate) fn from_documents(
        catalog: CatalogKind,
        documents: Vec<DocumentReport>,
        elapsed_ms: u64,
    ) -> Self {
        let mut report = Self {
            catalog,
            total: documents.len(),
            succeeded: 0,
            failed: 0,
            inserted: 0,
            updated: 0,
            assets: AssetTally::default(),
            elapsed_ms,
            documents: Vec::new(),
        };

        for doc in &documents {
            match &doc.result {
                DocumentResult::Synced { upsert } => {
                    report.succeeded += 1;
                    match upsert {
                        UpsertOutcome::Inserted => report.inserted += 1,
                        UpsertOutcome::Updated => report.updated += 1,
                    }
                }
                DocumentResult::Failed { .. } => report.failed += 1,
            }
            for asset in &doc.assets {
                report.assets.record(&asset.status);
            }
        }

        report.documents = documents;
        report
    }

    /// Failed documents, in source order.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.is_success())
    }

    /// Copy with the tallies intact and only the failed documents listed.
    pub fn failures_only(&self) -> Self {
        Self {
            catalog: self.catalog,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            inserted: self.inserted,
            updated: self.updated,
            assets: self.assets,
            elapsed_ms: self.elapsed_ms,
            documents: self.failures().cloned().collect(),
        }
    }

    /// One-line summary for logs and telemetry.
    pub fn summary(&self) -> String {
        format!(
            "{} sync: {}/{} documents synced ({} inserted, {} updated, {} failed); assets: {} uploaded ({} transformed), {} reused, {} absent, {} failed",
            self.catalog,
            self.succeeded,
            self.total,
            self.inserted,
            self.updated,
            self.failed,
            self.assets.uploaded,
            self.assets.transformed,
            self.assets.reused,
            self.assets.absent,
            self.assets.failed,
        )
    }
}
