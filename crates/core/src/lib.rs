pub mod cache;
pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod metrics;
pub mod retry;
pub mod runner;
pub mod source;
pub mod store;
pub mod sync;
pub mod target;
pub mod telemetry;
pub mod testing;
pub mod transform;

pub use cache::{AssetCache, AssetError, AssetOutcome, CacheConfig, CacheDecision};
pub use catalog::{AssetKey, AssetKind, CatalogKind, CatalogRecord, DeserializeError, ImageSet};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    SanitizedConfig, ServerConfig,
};
pub use fetcher::{AssetFetcher, FetchError, FetcherConfig, HostRule, HttpFetcher};
pub use retry::RetryConfig;
pub use runner::{RunSummary, RunnerError, RunnerStatus, SyncComponents, SyncRunner};
pub use source::{JsonFileSource, SourceConfig, SourceDocument, SourceError, SourceReader};
pub use store::{
    BlobBackend, FsBlobBackend, ObjectStore, ObjectStoreBuilder, PublicAccess, StorageBackend,
    StorageConfig, StoreError,
};
pub use sync::{AssetFailurePolicy, CatalogSyncer, SyncConfig, SyncError, SyncReport};
pub use target::{
    FieldSet, KeyFilter, SqliteDocumentStore, TargetConfig, TargetStore, UpsertError,
    UpsertOutcome,
};
pub use telemetry::{Telemetry, TracingTelemetry};
pub use transform::{ImageTransformer, JpegTransformer, TransformConfig, TransformError};
