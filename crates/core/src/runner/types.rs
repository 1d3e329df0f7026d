//! Types for the sync runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogKind;
use crate::sync::SyncReport;

/// Errors returned by the runner.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// Another run has not finished yet.
    #[error("a sync run is already in progress")]
    AlreadyRunning,
}

/// Result of one catalog within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRun {
    pub catalog: CatalogKind,
    /// Import report, absent when the batch could not be read.
    pub report: Option<SyncReport>,
    /// Source read error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogRun {
    pub fn synced(report: SyncReport) -> Self {
        Self {
            catalog: report.catalog,
            report: Some(report),
            error: None,
        }
    }

    pub fn source_failed(catalog: CatalogKind, error: impl Into<String>) -> Self {
        Self {
            catalog,
            report: None,
            error: Some(error.into()),
        }
    }
}

/// Summary of one sync run across all enabled catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub catalogs: Vec<CatalogRun>,
}

impl RunSummary {
    /// Report of `catalog`, if it was read and imported.
    pub fn report(&self, catalog: CatalogKind) -> Option<&SyncReport> {
        self.catalogs
            .iter()
            .find(|c| c.catalog == catalog)
            .and_then(|c| c.report.as_ref())
    }

    pub fn documents_synced(&self) -> usize {
        self.reports().map(|r| r.succeeded).sum()
    }

    pub fn documents_failed(&self) -> usize {
        self.reports().map(|r| r.failed).sum()
    }

    /// Catalogs whose source could not be read.
    pub fn source_failures(&self) -> usize {
        self.catalogs.iter().filter(|c| c.error.is_some()).count()
    }

    /// Copy for status reporting: per-document detail is kept for failures only.
    pub fn failures_only(&self) -> Self {
        Self {
            run_id: self.run_id.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
            catalogs: self
                .catalogs
                .iter()
                .map(|run| CatalogRun {
                    catalog: run.catalog,
                    report: run.report.as_ref().map(SyncReport::failures_only),
                    error: run.error.clone(),
                })
                .collect(),
        }
    }

    fn reports(&self) -> impl Iterator<Item = &SyncReport> {
        self.catalogs.iter().filter_map(|c| c.report.as_ref())
    }
}

/// Current runner status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerStatus {
    /// Whether the scheduling loop is running.
    pub running: bool,
    /// Whether a run is executing right now.
    pub in_progress: bool,
    /// Runs completed since startup.
    pub completed_runs: u64,
    pub last_run: Option<RunSummary>,
}
