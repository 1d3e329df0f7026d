//! Sync runner implementation.
//!
//! Runs every enabled catalog in order, either on demand or on a fixed
//! interval. At most one run executes at a time.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::{CatalogRun, RunSummary, RunnerError, RunnerStatus};
use crate::cache::{AssetCache, CacheConfig};
use crate::fetcher::AssetFetcher;
use crate::metrics;
use crate::source::SourceReader;
use crate::store::ObjectStore;
use crate::sync::{CatalogSyncer, SyncConfig};
use crate::target::TargetStore;
use crate::telemetry::{error_chain, Telemetry};
use crate::transform::ImageTransformer;

/// Collaborators shared by the syncers of every catalog.
pub struct SyncComponents {
    pub source: Arc<dyn SourceReader>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub transformer: Arc<dyn ImageTransformer>,
    /// Provisioned store; each catalog gets a scoped view of it.
    pub store: ObjectStore,
    pub target: Arc<dyn TargetStore>,
    pub telemetry: Arc<dyn Telemetry>,
}

/// State shared between the runner handle and its scheduling loop.
struct RunContext {
    source: Arc<dyn SourceReader>,
    syncers: Vec<CatalogSyncer>,
    telemetry: Arc<dyn Telemetry>,
    in_progress: AtomicBool,
    completed_runs: AtomicU64,
    last_run: RwLock<Option<RunSummary>>,
}

/// Releases the in-progress flag when the run ends.
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RunContext {
    fn claim(&self) -> Result<(), RunnerError> {
        self.in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| RunnerError::AlreadyRunning)
    }

    /// Executes a run. The caller must hold the in-progress claim.
    async fn execute(&self) -> RunSummary {
        let _guard = InProgressGuard(&self.in_progress);
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(run_id = %run_id, catalogs = self.syncers.len(), "Sync run started");

        let mut catalogs = Vec::with_capacity(self.syncers.len());
        for syncer in &self.syncers {
            let kind = syncer.kind();
            match self.source.read(kind).await {
                Ok(documents) => {
                    let report = syncer.import(documents).await;
                    catalogs.push(CatalogRun::synced(report));
                }
                Err(e) => {
                    error!(
                        run_id = %run_id,
                        catalog = %kind,
                        error = %e,
                        "Failed to read source batch"
                    );
                    self.telemetry.track_exception(&e);
                    catalogs.push(CatalogRun::source_failed(kind, error_chain(&e)));
                }
            }
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            catalogs,
        };

        metrics::SYNC_RUNS.inc();
        self.completed_runs.fetch_add(1, Ordering::SeqCst);
        *self.last_run.write().await = Some(summary.failures_only());

        info!(
            run_id = %summary.run_id,
            synced = summary.documents_synced(),
            failed = summary.documents_failed(),
            source_failures = summary.source_failures(),
            "Sync run finished"
        );
        summary
    }
}

/// Runs catalog syncs on demand and on a schedule.
pub struct SyncRunner {
    ctx: Arc<RunContext>,
    interval_secs: u64,
    run_on_start: bool,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncRunner {
    /// Create a runner over prebuilt syncers.
    pub fn new(
        source: Arc<dyn SourceReader>,
        syncers: Vec<CatalogSyncer>,
        telemetry: Arc<dyn Telemetry>,
        config: &SyncConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            ctx: Arc::new(RunContext {
                source,
                syncers,
                telemetry,
                in_progress: AtomicBool::new(false),
                completed_runs: AtomicU64::new(0),
                last_run: RwLock::new(None),
            }),
            interval_secs: config.interval_secs,
            run_on_start: config.run_on_start,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Build one syncer per catalog in `sync.catalogs`, each with its own
    /// asset cache over the store scoped to the catalog's asset folder.
    pub fn from_components(
        components: SyncComponents,
        cache: CacheConfig,
        sync: SyncConfig,
    ) -> Self {
        let syncers = sync
            .catalogs
            .iter()
            .map(|&kind| {
                let asset_cache = AssetCache::new(
                    Arc::clone(&components.fetcher),
                    Arc::clone(&components.transformer),
                    components.store.scoped(kind.asset_folder()),
                    Arc::clone(&components.telemetry),
                    cache.clone(),
                );
                CatalogSyncer::new(
                    kind,
                    Arc::new(asset_cache),
                    Arc::clone(&components.target),
                    Arc::clone(&components.telemetry),
                    sync.clone(),
                )
            })
            .collect();

        Self::new(components.source, syncers, components.telemetry, &sync)
    }

    /// Run every catalog now and wait for the result.
    pub async fn run_once(&self) -> Result<RunSummary, RunnerError> {
        self.ctx.claim()?;
        Ok(self.ctx.execute().await)
    }

    /// Start a run in the background.
    ///
    /// The claim is taken before returning, so a second call fails with
    /// `AlreadyRunning` until the spawned run finishes.
    pub fn trigger(&self) -> Result<(), RunnerError> {
        self.ctx.claim()?;
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            ctx.execute().await;
        });
        Ok(())
    }

    /// Start the scheduling loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync runner already running");
            return;
        }

        info!(
            interval_secs = self.interval_secs,
            run_on_start = self.run_on_start,
            "Starting sync runner"
        );
        self.spawn_schedule_loop();
    }

    /// Stop the scheduling loop. A run in progress completes.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync runner not running");
            return;
        }

        info!("Stopping sync runner");
        let _ = self.shutdown_tx.send(());
    }

    /// Get current runner status.
    pub async fn status(&self) -> RunnerStatus {
        RunnerStatus {
            running: self.running.load(Ordering::Relaxed),
            in_progress: self.ctx.in_progress.load(Ordering::SeqCst),
            completed_runs: self.ctx.completed_runs.load(Ordering::SeqCst),
            last_run: self.ctx.last_run.read().await.clone(),
        }
    }

    fn spawn_schedule_loop(&self) {
        let ctx = Arc::clone(&self.ctx);
        let running = Arc::clone(&self.running);
        let interval_secs = self.interval_secs;
        let run_on_start = self.run_on_start;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Sync schedule loop started");
            if run_on_start {
                Self::scheduled_run(&ctx).await;
            }
            if interval_secs == 0 {
                info!("No sync interval configured, schedule loop done");
                return;
            }

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync schedule loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::scheduled_run(&ctx).await;
                    }
                }
            }
            info!("Sync schedule loop stopped");
        });
    }

    async fn scheduled_run(ctx: &RunContext) {
        match ctx.claim() {
            Ok(()) => {
                ctx.execute().await;
            }
            Err(e) => warn!("Skipping scheduled sync: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogKind;
    use crate::source::{JsonFileSource, SourceDocument, SourceError};
    use crate::store::ObjectStoreBuilder;
    use crate::target::{KeyFilter, SqliteDocumentStore};
    use crate::testing::{fixtures, MemoryBlobBackend, MockFetcher, RecordingTelemetry};
    use crate::transform::JpegTransformer;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Setup {
        temp: TempDir,
        fetcher: Arc<MockFetcher>,
        target: Arc<SqliteDocumentStore>,
        telemetry: RecordingTelemetry,
    }

    impl Setup {
        async fn components(&self, source: Arc<dyn SourceReader>) -> SyncComponents {
            let store = ObjectStoreBuilder::new(Arc::new(MemoryBlobBackend::new()), "assets")
                .provision()
                .await
                .unwrap();
            SyncComponents {
                source,
                fetcher: self.fetcher.clone(),
                transformer: Arc::new(JpegTransformer::default()),
                store,
                target: self.target.clone(),
                telemetry: Arc::new(self.telemetry.clone()),
            }
        }

        fn dir(&self) -> PathBuf {
            self.temp.path().to_path_buf()
        }
    }

    async fn setup() -> Setup {
        let temp = TempDir::new().unwrap();
        let animes = serde_json::to_string(&vec![
            fixtures::anime_document(1, "One", "http://x/a.jpg"),
            fixtures::anime_document(2, "Two", ""),
        ])
        .unwrap();
        std::fs::write(temp.path().join("animes.json"), animes).unwrap();
        std::fs::write(
            temp.path().join("shows.jsonl"),
            serde_json::to_string(&fixtures::show_document("tt1", "Show", "")).unwrap(),
        )
        .unwrap();

        let fetcher = Arc::new(MockFetcher::new());
        fetcher
            .set_default_response(fixtures::jpeg_bytes(40, 60))
            .await;

        Setup {
            temp,
            fetcher,
            target: Arc::new(SqliteDocumentStore::in_memory().unwrap()),
            telemetry: RecordingTelemetry::new(),
        }
    }

    #[tokio::test]
    async fn test_run_once_syncs_every_catalog() {
        let s = setup().await;
        let source = Arc::new(JsonFileSource::new(s.dir()));
        let runner = SyncRunner::from_components(
            s.components(source).await,
            CacheConfig::default(),
            SyncConfig::default(),
        );

        let summary = runner.run_once().await.unwrap();
        assert_eq!(summary.catalogs.len(), 3);
        assert_eq!(summary.report(CatalogKind::Movies).unwrap().total, 0);
        assert_eq!(summary.report(CatalogKind::Shows).unwrap().succeeded, 1);
        assert_eq!(summary.report(CatalogKind::Animes).unwrap().succeeded, 2);
        assert_eq!(summary.documents_synced(), 3);

        let anime = s
            .target
            .find_one("animes", &KeyFilter::new("mal_id", "1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            anime["images"]["poster"],
            "https://blobs.test/assets/animes/1/poster/a.jpg"
        );

        let status = runner.status().await;
        assert_eq!(status.completed_runs, 1);
        assert!(!status.in_progress);
        let last_run = status.last_run.unwrap();
        assert_eq!(last_run.run_id, summary.run_id);
        assert_eq!(summary.report(CatalogKind::Animes).unwrap().documents.len(), 2);
        let stored = last_run.report(CatalogKind::Animes).unwrap();
        assert_eq!(stored.succeeded, 2);
        assert!(stored.documents.is_empty());
    }

    #[tokio::test]
    async fn test_only_one_run_at_a_time() {
        let s = setup().await;
        s.fetcher
            .set_delay(std::time::Duration::from_millis(200))
            .await;
        let source = Arc::new(JsonFileSource::new(s.dir()));
        let runner = SyncRunner::from_components(
            s.components(source).await,
            CacheConfig::default(),
            SyncConfig::default().with_catalogs(vec![CatalogKind::Animes]),
        );

        runner.trigger().unwrap();
        assert_eq!(runner.trigger(), Err(RunnerError::AlreadyRunning));
        assert!(matches!(
            runner.run_once().await,
            Err(RunnerError::AlreadyRunning)
        ));

        for _ in 0..50 {
            if runner.status().await.completed_runs == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let status = runner.status().await;
        assert_eq!(status.completed_runs, 1);
        assert!(!status.in_progress);
        assert!(runner.run_once().await.is_ok());
    }

    struct BrokenMovies(JsonFileSource);

    #[async_trait]
    impl SourceReader for BrokenMovies {
        fn name(&self) -> &str {
            "broken_movies"
        }

        async fn read(&self, kind: CatalogKind) -> Result<Vec<SourceDocument>, SourceError> {
            if kind == CatalogKind::Movies {
                return Err(SourceError::Io {
                    path: PathBuf::from("movies.json"),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.0.read(kind).await
        }
    }

    #[tokio::test]
    async fn test_source_failure_does_not_stop_other_catalogs() {
        let s = setup().await;
        let source = Arc::new(BrokenMovies(JsonFileSource::new(s.dir())));
        let runner = SyncRunner::from_components(
            s.components(source).await,
            CacheConfig::default(),
            SyncConfig::default(),
        );

        let summary = runner.run_once().await.unwrap();
        assert_eq!(summary.source_failures(), 1);
        assert!(summary.report(CatalogKind::Movies).is_none());
        assert_eq!(summary.report(CatalogKind::Animes).unwrap().succeeded, 2);
        assert!(s
            .telemetry
            .recorded_exceptions()
            .iter()
            .any(|e| e.contains("denied")));
    }

    #[tokio::test]
    async fn test_start_runs_on_start_and_stops() {
        let s = setup().await;
        let source = Arc::new(JsonFileSource::new(s.dir()));
        let runner = SyncRunner::from_components(
            s.components(source).await,
            CacheConfig::default(),
            SyncConfig::default()
                .with_catalogs(vec![CatalogKind::Shows])
                .with_interval_secs(3600),
        );

        runner.start();
        assert!(runner.status().await.running);

        for _ in 0..50 {
            if runner.status().await.completed_runs == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(runner.status().await.completed_runs, 1);

        runner.stop();
        assert!(!runner.status().await.running);
    }
}
