use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelsync_core::{
    load_config, validate_config, Config, FsBlobBackend, HttpFetcher, JpegTransformer,
    JsonFileSource, LogFormat, ObjectStoreBuilder, SqliteDocumentStore, StorageBackend,
    SyncComponents, SyncRunner, TargetStore, TracingTelemetry,
};
use reelsync_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Tracing may not be installed yet when config loading fails
        eprintln!("Fatal error: {:#}", e);
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("REELSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    init_tracing(config.server.log_format);
    info!("Configuration loaded from {:?}", config_path);
    info!("Source directory: {:?}", config.source.dir);
    info!("Target database: {:?}", config.target.path);

    let (runner, target) = build_runner(&config).await?;
    let runner = Arc::new(runner);
    runner.start();
    info!(
        interval_secs = config.sync.interval_secs,
        run_on_start = config.sync.run_on_start,
        "Sync runner started"
    );

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&runner), target));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Stopping sync runner...");
    runner.stop();
    info!("Server shut down");

    Ok(())
}

async fn build_runner(config: &Config) -> Result<(SyncRunner, Arc<dyn TargetStore>)> {
    if let Some(parent) = config
        .target
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let target: Arc<dyn TargetStore> = Arc::new(
        SqliteDocumentStore::new(&config.target.path).context("Failed to open target store")?,
    );
    info!("Target store initialized");

    let backend = match config.storage.backend {
        StorageBackend::Filesystem => {
            info!(
                "Using filesystem blob storage at {:?}",
                config.storage.filesystem.root
            );
            Arc::new(FsBlobBackend::from_config(&config.storage.filesystem))
        }
    };
    let store = ObjectStoreBuilder::new(backend, config.storage.container.clone())
        .provision()
        .await
        .context("Failed to provision object store")?;
    info!("Object store container '{}' ready", config.storage.container);

    let fetcher = HttpFetcher::new(&config.fetcher).context("Failed to create HTTP fetcher")?;

    let components = SyncComponents {
        source: Arc::new(JsonFileSource::new(config.source.dir.clone())),
        fetcher: Arc::new(fetcher),
        transformer: Arc::new(JpegTransformer::new(config.transform.clone())),
        store,
        target: Arc::clone(&target),
        telemetry: Arc::new(TracingTelemetry),
    };

    let runner = SyncRunner::from_components(components, config.cache.clone(), config.sync.clone());
    Ok((runner, target))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
