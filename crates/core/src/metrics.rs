//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync (documents, runs)
//! - Assets (cache outcomes, fetches, transforms)
//! - Target store (upserts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Documents processed total by catalog and result.
pub static DOCUMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelsync_documents_total", "Total documents processed"),
        &["catalog", "result"], // "upserted", "failed"
    )
    .unwrap()
});

/// Per-document processing duration in seconds.
pub static DOCUMENT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelsync_document_duration_seconds",
            "Duration of a single document sync",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["catalog"],
    )
    .unwrap()
});

/// Completed sync runs.
pub static SYNC_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("reelsync_sync_runs_total", "Total completed sync runs").unwrap()
});

// =============================================================================
// Asset Metrics
// =============================================================================

/// Asset cache outcomes by kind.
pub static ASSETS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelsync_assets_total", "Total asset cache outcomes"),
        &["kind", "outcome"], // "absent", "reused", "uploaded", "failed"
    )
    .unwrap()
});

/// Transforms that fell back to the original bytes.
pub static TRANSFORM_FALLBACKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelsync_transform_fallbacks_total",
            "Total transforms that fell back to the original bytes",
        ),
        &["kind"],
    )
    .unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("reelsync_fetch_duration_seconds", "Duration of asset fetches")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Target Store Metrics
// =============================================================================

/// Upsert duration in seconds.
pub static UPSERT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("reelsync_upsert_duration_seconds", "Duration of upserts")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["collection", "result"], // "inserted", "updated", "failed"
    )
    .unwrap()
});

/// Retry attempts total by operation.
pub static RETRY_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelsync_retry_attempts_total", "Total retry attempts"),
        &["operation"], // "fetch", "upsert"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(DOCUMENTS_TOTAL.clone()),
        Box::new(DOCUMENT_DURATION.clone()),
        Box::new(SYNC_RUNS.clone()),
        // Assets
        Box::new(ASSETS_TOTAL.clone()),
        Box::new(TRANSFORM_FALLBACKS.clone()),
        Box::new(FETCH_DURATION.clone()),
        // Target store
        Box::new(UPSERT_DURATION.clone()),
        Box::new(RETRY_ATTEMPTS_TOTAL.clone()),
    ]
}
