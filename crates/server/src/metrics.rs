//! Prometheus metrics for observability.
//!
//! Server-side metrics:
//! - HTTP request metrics (latency, counts, auth failures)
//! - Runner and target store state (collected dynamically)
//!
//! Core sync metrics are registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use reelsync_core::CatalogKind;
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelsync_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelsync_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelsync_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelsync_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"], // "missing", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Runner Metrics (collected dynamically)
// =============================================================================

/// Scheduler state (1 = started, 0 = stopped).
pub static SYNC_RUNNER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelsync_sync_runner_running",
        "Whether the sync scheduler is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Whether a sync run is in progress.
pub static SYNC_IN_PROGRESS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelsync_sync_in_progress",
        "Whether a sync run is currently in progress",
    )
    .unwrap()
});

// =============================================================================
// Target Metrics (collected dynamically)
// =============================================================================

/// Documents stored per target collection.
pub static TARGET_DOCUMENTS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "reelsync_target_documents",
            "Number of documents in each target collection",
        ),
        &["collection"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Runner
    registry
        .register(Box::new(SYNC_RUNNER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(SYNC_IN_PROGRESS.clone()))
        .unwrap();

    // Target
    registry
        .register(Box::new(TARGET_DOCUMENTS.clone()))
        .unwrap();

    // Core metrics (sync, assets, target store)
    for metric in reelsync_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the runner and target store.
pub async fn collect_dynamic_metrics(state: &AppState) {
    let status = state.runner().status().await;
    SYNC_RUNNER_RUNNING.set(i64::from(status.running));
    SYNC_IN_PROGRESS.set(i64::from(status.in_progress));

    for kind in CatalogKind::ALL {
        let collection = kind.collection();
        if let Ok(count) = state.target().count(collection).await {
            TARGET_DOCUMENTS
                .with_label_values(&[collection])
                .set(count as i64);
        }
    }
}

static CATALOG_KEY_PATH: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"^(/api/v1/catalog/[^/]+)/[^/]+$").unwrap());

/// Normalize a path for metric labels (replace keys with placeholders).
pub fn normalize_path(path: &str) -> String {
    if path.starts_with("/assets/") {
        return "/assets/{path}".to_string();
    }

    CATALOG_KEY_PATH.replace(path, "$1/{key}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_catalog_key() {
        assert_eq!(
            normalize_path("/api/v1/catalog/movies/tt0111161"),
            "/api/v1/catalog/movies/{key}"
        );
        assert_eq!(
            normalize_path("/api/v1/catalog/animes/21"),
            "/api/v1/catalog/animes/{key}"
        );
    }

    #[test]
    fn test_normalize_path_assets() {
        assert_eq!(
            normalize_path("/assets/animes/1/poster/a.jpg"),
            "/assets/{path}"
        );
    }

    #[test]
    fn test_normalize_path_no_keys() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/sync/status"), "/api/v1/sync/status");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("reelsync_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        SYNC_RUNNER_RUNNING.set(0);
        SYNC_IN_PROGRESS.set(0);
        TARGET_DOCUMENTS.with_label_values(&["movies"]).set(0);
        reelsync_core::metrics::SYNC_RUNS.inc_by(0);

        let output = encode_metrics();

        assert!(output.contains("reelsync_http_request_duration_seconds"));
        assert!(output.contains("reelsync_http_requests_in_flight"));
        assert!(output.contains("reelsync_sync_runner_running"));
        assert!(output.contains("reelsync_sync_in_progress"));
        assert!(output.contains("reelsync_target_documents"));
        assert!(output.contains("reelsync_sync_runs_total"));
    }
}
