//! Fetch, transform and upload of a single asset.

use std::sync::Arc;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::error::AssetError;
use super::key_lock::KeyLocks;
use super::types::{AssetOutcome, CacheDecision};
use crate::catalog::{parse_absolute_url, AssetKey, AssetKind};
use crate::fetcher::{AssetFetcher, FetchError};
use crate::metrics;
use crate::retry::retry_with_backoff;
use crate::store::ObjectStore;
use crate::telemetry::Telemetry;
use crate::transform::{ImageTransformer, TransformError};

/// Mirrors remote assets into an [`ObjectStore`].
pub struct AssetCache {
    fetcher: Arc<dyn AssetFetcher>,
    transformer: Arc<dyn ImageTransformer>,
    store: ObjectStore,
    telemetry: Arc<dyn Telemetry>,
    config: CacheConfig,
    locks: KeyLocks,
}

impl AssetCache {
    pub fn new(
        fetcher: Arc<dyn AssetFetcher>,
        transformer: Arc<dyn ImageTransformer>,
        store: ObjectStore,
        telemetry: Arc<dyn Telemetry>,
        config: CacheConfig,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            store,
            telemetry,
            config,
            locks: KeyLocks::new(),
        }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Makes sure the asset at `source_url` is stored under `key`.
    ///
    /// Calls for the same key are serialized from the existence check through
    /// the upload. With `force_replace` the existence check is skipped.
    pub async fn ensure_cached(
        &self,
        key: &AssetKey,
        source_url: &str,
        kind: AssetKind,
        force_replace: bool,
    ) -> Result<AssetOutcome, AssetError> {
        let result = self.resolve(key, source_url, kind, force_replace).await;

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "failed",
        };
        metrics::ASSETS_TOTAL
            .with_label_values(&[kind.as_str(), label])
            .inc();

        result
    }

    /// Like [`ensure_cached`](Self::ensure_cached) but degrades any failure to
    /// an empty URL after reporting it to telemetry.
    pub async fn ensure_cached_or_empty(
        &self,
        key: &AssetKey,
        source_url: &str,
        kind: AssetKind,
        force_replace: bool,
    ) -> String {
        match self.ensure_cached(key, source_url, kind, force_replace).await {
            Ok(outcome) => outcome.url().to_string(),
            Err(e) => {
                warn!(key = %key, error = %e, "Asset degraded to empty URL");
                self.telemetry.track_exception(&e);
                String::new()
            }
        }
    }

    async fn resolve(
        &self,
        key: &AssetKey,
        source_url: &str,
        kind: AssetKind,
        force_replace: bool,
    ) -> Result<AssetOutcome, AssetError> {
        if parse_absolute_url(source_url).is_none() {
            debug!(key = %key, source_url, "No usable source URL");
            return Ok(AssetOutcome::Absent);
        }

        let _guard = self.locks.lock(key.as_str()).await;

        let exists = if force_replace {
            false
        } else {
            self.store
                .exists(key)
                .await
                .map_err(|source| AssetError::Store {
                    key: key.to_string(),
                    source,
                })?
        };

        let decision = CacheDecision::decide(force_replace, exists);
        debug!(key = %key, ?decision, force_replace, "Cache decision");

        if decision == CacheDecision::Reuse {
            return Ok(AssetOutcome::Reused {
                url: self.store.public_url(key),
            });
        }

        let bytes = retry_with_backoff(
            &self.config.retry,
            "fetch",
            FetchError::is_retryable,
            || self.fetcher.fetch(source_url),
        )
        .await
        .map_err(|source| AssetError::Fetch {
            key: key.to_string(),
            source,
        })?;

        let (bytes, transformed) = if kind.requires_transform() {
            self.transform_or_original(key, bytes, kind).await
        } else {
            (bytes, false)
        };

        let stored = self
            .store
            .upload(key, bytes)
            .await
            .map_err(|source| AssetError::Store {
                key: key.to_string(),
                source,
            })?;

        debug!(
            key = %stored.key,
            size = stored.size_bytes,
            transformed,
            "Asset uploaded"
        );

        Ok(AssetOutcome::Uploaded {
            url: stored.url,
            transformed,
        })
    }

    /// Runs the transformer on the blocking pool, falling back to `raw` on failure.
    async fn transform_or_original(
        &self,
        key: &AssetKey,
        raw: Vec<u8>,
        kind: AssetKind,
    ) -> (Vec<u8>, bool) {
        let raw: Arc<[u8]> = Arc::from(raw);
        let input = Arc::clone(&raw);
        let transformer = Arc::clone(&self.transformer);

        let result = tokio::task::spawn_blocking(move || transformer.transform(&input, kind))
            .await
            .unwrap_or_else(|e| Err(TransformError::Panicked(e.to_string())));

        match result {
            Ok(bytes) => (bytes, true),
            Err(e) => {
                warn!(key = %key, error = %e, "Transform failed, uploading original bytes");
                metrics::TRANSFORM_FALLBACKS
                    .with_label_values(&[kind.as_str()])
                    .inc();
                (raw.to_vec(), false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use crate::store::ObjectStoreBuilder;
    use crate::testing::fixtures::jpeg_bytes;
    use crate::testing::{MemoryBlobBackend, MockFetcher, RecordingTelemetry};
    use crate::transform::JpegTransformer;
    use std::time::Duration;

    struct Harness {
        cache: Arc<AssetCache>,
        fetcher: Arc<MockFetcher>,
        backend: Arc<MemoryBlobBackend>,
        telemetry: Arc<RecordingTelemetry>,
    }

    async fn harness_with(
        transformer: Arc<dyn ImageTransformer>,
        config: CacheConfig,
    ) -> Harness {
        let fetcher = Arc::new(MockFetcher::new());
        let backend = Arc::new(MemoryBlobBackend::new());
        let telemetry = Arc::new(RecordingTelemetry::new());
        let store = ObjectStoreBuilder::new(backend.clone(), "assets")
            .provision()
            .await
            .unwrap()
            .scoped("animes");

        let cache = Arc::new(AssetCache::new(
            fetcher.clone(),
            transformer,
            store,
            telemetry.clone(),
            config,
        ));

        Harness {
            cache,
            fetcher,
            backend,
            telemetry,
        }
    }

    async fn harness() -> Harness {
        harness_with(Arc::new(JpegTransformer::default()), CacheConfig::default()).await
    }

    struct PanickingTransformer;

    impl ImageTransformer for PanickingTransformer {
        fn name(&self) -> &str {
            "panicking"
        }

        fn transform(&self, _bytes: &[u8], _kind: AssetKind) -> Result<Vec<u8>, TransformError> {
            panic!("codec exploded");
        }
    }

    #[tokio::test]
    async fn test_absent_url_does_no_work() {
        let h = harness().await;

        for url in ["", "not-a-url", "/relative.jpg"] {
            let key = AssetKey::derive("2", AssetKind::Poster, url);
            let outcome = h
                .cache
                .ensure_cached(&key, url, AssetKind::Poster, false)
                .await
                .unwrap();
            assert_eq!(outcome, AssetOutcome::Absent);
            assert_eq!(
                h.cache
                    .ensure_cached_or_empty(&key, url, AssetKind::Poster, true)
                    .await,
                ""
            );
        }

        assert_eq!(h.fetcher.request_count().await, 0);
        assert_eq!(h.backend.exists_count().await, 0);
        assert_eq!(h.backend.put_count().await, 0);
    }

    #[tokio::test]
    async fn test_second_call_reuses() {
        let h = harness().await;
        h.fetcher
            .set_response("http://x/a.jpg", jpeg_bytes(800, 1200))
            .await;
        let key = AssetKey::derive("1", AssetKind::Poster, "http://x/a.jpg");

        let first = h
            .cache
            .ensure_cached(&key, "http://x/a.jpg", AssetKind::Poster, false)
            .await
            .unwrap();
        let second = h
            .cache
            .ensure_cached(&key, "http://x/a.jpg", AssetKind::Poster, false)
            .await
            .unwrap();

        assert!(matches!(first, AssetOutcome::Uploaded { transformed: true, .. }));
        assert!(matches!(second, AssetOutcome::Reused { .. }));
        assert_eq!(first.url(), second.url());
        assert_eq!(h.fetcher.request_count().await, 1);
        assert_eq!(h.backend.put_count().await, 1);
        assert_eq!(
            h.backend.recorded_puts().await,
            vec!["animes/1/poster/a.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_concurrent_callers_upload_once() {
        let h = harness().await;
        h.fetcher
            .set_response("http://x/a.jpg", jpeg_bytes(64, 64))
            .await;
        h.fetcher.set_delay(Duration::from_millis(20)).await;
        let key = AssetKey::derive("1", AssetKind::Banner, "http://x/a.jpg");

        let calls = (0..6).map(|_| {
            let cache = Arc::clone(&h.cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .ensure_cached(&key, "http://x/a.jpg", AssetKind::Banner, false)
                    .await
                    .unwrap()
            })
        });
        let outcomes = futures::future::join_all(calls).await;

        let urls: Vec<String> = outcomes
            .into_iter()
            .map(|o| o.unwrap().url().to_string())
            .collect();
        assert!(urls.iter().all(|u| u == &urls[0]));
        assert_eq!(h.fetcher.request_count().await, 1);
        assert_eq!(h.backend.put_count().await, 1);
    }

    #[tokio::test]
    async fn test_force_replace_always_uploads() {
        let h = harness().await;
        let url = "http://x/fan.jpg";
        let key = AssetKey::derive("1", AssetKind::Fanart, url);

        h.fetcher.set_response(url, b"old".to_vec()).await;
        h.cache
            .ensure_cached(&key, url, AssetKind::Fanart, true)
            .await
            .unwrap();

        h.fetcher.set_response(url, b"new".to_vec()).await;
        let outcome = h
            .cache
            .ensure_cached(&key, url, AssetKind::Fanart, true)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AssetOutcome::Uploaded {
                url: h.cache.store().public_url(&key),
                transformed: false
            }
        );
        assert_eq!(h.fetcher.request_count().await, 2);
        assert_eq!(h.backend.put_count().await, 2);
        assert_eq!(h.backend.exists_count().await, 0);
        assert_eq!(
            h.backend.object("assets", "animes/1/fanart/fan.jpg").await,
            Some(b"new".to_vec())
        );
    }

    #[tokio::test]
    async fn test_undecodable_bytes_fall_back_to_original() {
        let h = harness().await;
        let url = "http://x/p.jpg";
        h.fetcher.set_response(url, b"<html>denied</html>".to_vec()).await;
        let key = AssetKey::derive("3", AssetKind::Poster, url);

        let outcome = h
            .cache
            .ensure_cached(&key, url, AssetKind::Poster, false)
            .await
            .unwrap();

        assert!(matches!(outcome, AssetOutcome::Uploaded { transformed: false, .. }));
        assert_eq!(
            h.backend.object("assets", "animes/3/poster/p.jpg").await,
            Some(b"<html>denied</html>".to_vec())
        );
    }

    #[tokio::test]
    async fn test_transformer_panic_falls_back_to_original() {
        let h = harness_with(Arc::new(PanickingTransformer), CacheConfig::default()).await;
        let url = "http://x/b.jpg";
        h.fetcher.set_response(url, vec![1, 2, 3]).await;
        let key = AssetKey::derive("4", AssetKind::Banner, url);

        let outcome = h
            .cache
            .ensure_cached(&key, url, AssetKind::Banner, false)
            .await
            .unwrap();

        assert!(matches!(outcome, AssetOutcome::Uploaded { transformed: false, .. }));
        assert_eq!(
            h.backend.object("assets", "animes/4/banner/b.jpg").await,
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let h = harness().await;
        let url = "http://x/missing.jpg";
        h.fetcher.set_status(url, 404).await;
        let key = AssetKey::derive("5", AssetKind::Poster, url);

        let err = h
            .cache
            .ensure_cached(&key, url, AssetKind::Poster, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Fetch { .. }));
        assert_eq!(err.key(), "5/poster/missing.jpg");
        assert!(h.telemetry.recorded_exceptions().is_empty());

        let url_or_empty = h
            .cache
            .ensure_cached_or_empty(&key, url, AssetKind::Poster, false)
            .await;
        assert_eq!(url_or_empty, "");
        assert_eq!(h.telemetry.recorded_exceptions().len(), 1);
        assert_eq!(h.backend.put_count().await, 0);
    }

    #[tokio::test]
    async fn test_retryable_fetch_failures_are_retried() {
        let config = CacheConfig::default().with_retry(
            RetryConfig::default()
                .with_max_attempts(3)
                .with_initial_delay_ms(1),
        );
        let h = harness_with(Arc::new(JpegTransformer::default()), config).await;
        let url = "http://x/flaky.jpg";
        h.fetcher.set_status(url, 503).await;
        let key = AssetKey::derive("6", AssetKind::Fanart, url);

        let err = h
            .cache
            .ensure_cached(&key, url, AssetKind::Fanart, false)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(h.fetcher.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_store_failure_is_an_asset_error() {
        let h = harness().await;
        let url = "http://x/a.jpg";
        h.fetcher.set_response(url, b"bytes".to_vec()).await;
        h.backend
            .set_next_error(crate::store::StoreError::Backend("down".to_string()))
            .await;
        let key = AssetKey::derive("7", AssetKind::Fanart, url);

        let err = h
            .cache
            .ensure_cached(&key, url, AssetKind::Fanart, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Store { .. }));
        assert_eq!(h.fetcher.request_count().await, 0);
    }
}
