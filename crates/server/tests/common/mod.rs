//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router over a real runner wired to a mock fetcher,
//! a filesystem blob store and an in-memory target, all under a temp dir.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use reelsync_core::{
    testing::{MockFetcher, RecordingTelemetry},
    CacheConfig, CatalogKind, Config, FsBlobBackend, JpegTransformer, JsonFileSource,
    ObjectStoreBuilder, SqliteDocumentStore, SyncComponents, SyncConfig, SyncRunner, TargetStore,
};

/// Re-export fixtures for test convenience
pub use reelsync_core::testing::fixtures;

/// Public base URL the fixture's blob backend writes into documents.
pub const PUBLIC_BASE_URL: &str = "http://localhost/assets";

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.get("/api/v1/health").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Runner behind the API
    pub runner: Arc<SyncRunner>,
    /// Mock fetcher - configure asset responses
    pub fetcher: Arc<MockFetcher>,
    /// Target store the runner writes to
    pub target: Arc<SqliteDocumentStore>,
    pub telemetry: RecordingTelemetry,
    /// Temporary directory holding source files and blobs
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// API key guarding `POST /sync`
    pub api_key: Option<String>,
}

impl TestConfig {
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source_dir = temp_dir.path().join("source");
        let blob_root = temp_dir.path().join("blobs");
        std::fs::create_dir_all(&source_dir).expect("Failed to create source dir");

        let mut config = Config::default();
        config.source.dir = source_dir.clone();
        config.storage.filesystem.root = blob_root.clone();
        config.storage.filesystem.public_base_url = PUBLIC_BASE_URL.to_string();
        config.server.api_key = test_config.api_key;
        config.sync = SyncConfig::default().with_run_on_start(false);

        let fetcher = Arc::new(MockFetcher::new());
        let telemetry = RecordingTelemetry::new();
        let target =
            Arc::new(SqliteDocumentStore::in_memory().expect("Failed to create target store"));
        let backend = Arc::new(FsBlobBackend::from_config(&config.storage.filesystem));
        let store = ObjectStoreBuilder::new(backend, config.storage.container.clone())
            .provision()
            .await
            .expect("Failed to provision store");

        let runner = Arc::new(SyncRunner::from_components(
            SyncComponents {
                source: Arc::new(JsonFileSource::new(source_dir)),
                fetcher: fetcher.clone(),
                transformer: Arc::new(JpegTransformer::default()),
                store,
                target: target.clone(),
                telemetry: Arc::new(telemetry.clone()),
            },
            CacheConfig::default(),
            config.sync.clone(),
        ));

        let state = Arc::new(reelsync_server::state::AppState::new(
            config,
            Arc::clone(&runner),
            target.clone() as Arc<dyn TargetStore>,
        ));
        let router = reelsync_server::api::create_router(state);

        Self {
            router,
            runner,
            fetcher,
            target,
            telemetry,
            temp_dir,
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.temp_dir.path().join("source")
    }

    /// Write the source export for a catalog.
    pub fn write_source(&self, kind: CatalogKind, documents: &[Value]) {
        let path = self.source_dir().join(format!("{}.json", kind.collection()));
        std::fs::write(path, serde_json::to_vec(documents).unwrap())
            .expect("Failed to write source file");
    }

    /// Wait until the runner has completed `runs` runs.
    pub async fn wait_for_runs(&self, runs: u64) {
        for _ in 0..200 {
            if self.runner.status().await.completed_runs >= runs {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("runner did not complete {} runs in time", runs);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, &[]).await
    }

    /// Send a POST request with no body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path, &[]).await
    }

    /// Send a POST request with extra headers.
    pub async fn post_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("POST", path, headers).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }
        let request = request_builder.body(Body::empty()).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        let text = String::from_utf8_lossy(&body_bytes).into_owned();

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
