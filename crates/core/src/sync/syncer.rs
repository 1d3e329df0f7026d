//! Batch import of one catalog.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use super::config::{AssetFailurePolicy, SyncConfig};
use super::error::SyncError;
use super::types::{
    AssetReport, AssetStatus, DocumentReport, DocumentResult, DocumentStage, SyncReport,
};
use crate::cache::AssetCache;
use crate::catalog::{AssetKey, CatalogKind, CatalogRecord};
use crate::metrics;
use crate::retry::retry_with_backoff;
use crate::source::SourceDocument;
use crate::target::{FieldSet, KeyFilter, TargetStore, UpsertError, UpsertOutcome};
use crate::telemetry::Telemetry;

/// Imports source documents of one catalog into the target store,
/// mirroring their images on the way.
pub struct CatalogSyncer {
    kind: CatalogKind,
    cache: Arc<AssetCache>,
    target: Arc<dyn TargetStore>,
    telemetry: Arc<dyn Telemetry>,
    config: SyncConfig,
}

impl CatalogSyncer {
    pub fn new(
        kind: CatalogKind,
        cache: Arc<AssetCache>,
        target: Arc<dyn TargetStore>,
        telemetry: Arc<dyn Telemetry>,
        config: SyncConfig,
    ) -> Self {
        Self {
            kind,
            cache,
            target,
            telemetry,
            config,
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    /// Imports the whole batch. Failed documents are reported, never fatal.
    pub async fn import(&self, documents: Vec<SourceDocument>) -> SyncReport {
        let start = Instant::now();
        let concurrency = self.config.max_concurrent_documents.max(1);
        info!(
            catalog = %self.kind,
            documents = documents.len(),
            concurrency,
            "Starting catalog import"
        );
        self.telemetry.track_trace(&format!(
            "{} import of {} documents started at {}",
            self.kind,
            documents.len(),
            Utc::now().to_rfc3339()
        ));

        let mut reports: Vec<DocumentReport> = stream::iter(documents.into_iter().enumerate())
            .map(|(index, document)| self.process(index, document))
            .buffer_unordered(concurrency)
            .collect()
            .await;
        reports.sort_by_key(|r| r.index);

        let report =
            SyncReport::from_documents(self.kind, reports, start.elapsed().as_millis() as u64);

        let summary = report.summary();
        info!(
            catalog = %self.kind,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "{}",
            summary
        );
        self.telemetry.track_trace(&summary);

        report
    }

    async fn process(&self, index: usize, document: SourceDocument) -> DocumentReport {
        let start = Instant::now();
        let report = self.process_inner(index, document).await;

        let result = if report.is_success() { "upserted" } else { "failed" };
        metrics::DOCUMENTS_TOTAL
            .with_label_values(&[self.kind.collection(), result])
            .inc();
        metrics::DOCUMENT_DURATION
            .with_label_values(&[self.kind.collection()])
            .observe(start.elapsed().as_secs_f64());

        report
    }

    async fn process_inner(&self, index: usize, document: SourceDocument) -> DocumentReport {
        let mut stage = DocumentStage::Start;
        let mut record = match CatalogRecord::from_document(self.kind, &document) {
            Ok(record) => record,
            Err(source) => {
                let err = SyncError::Deserialize { index, source };
                return self.fail(index, None, stage, Vec::new(), err);
            }
        };
        let key = record.natural_key().to_string();
        self.advance(&key, &mut stage);
        debug!(catalog = %self.kind, key = %key, title = record.title(), "Document deserialized");

        // Scalars exclude images.
        let scalars = match record.scalar_fields() {
            Ok(scalars) => scalars,
            Err(e) => {
                let err = self.upsert_error(&key, UpsertError::Serialization(e));
                return self.fail(index, Some(key), stage, Vec::new(), err);
            }
        };

        let assets = self.cache_assets(&mut record).await;
        self.advance(&key, &mut stage);

        let mut fields = FieldSet::new();
        for (field, value) in scalars {
            fields.set(field, value);
        }
        for asset in &assets {
            if let Some(url) = &asset.url {
                fields.set(format!("images.{}", asset.kind), url.clone());
            }
        }

        let filter = KeyFilter::new(self.kind.key_field(), key.clone());
        let collection = self.kind.collection();
        let upserted: Result<UpsertOutcome, UpsertError> = retry_with_backoff(
            &self.config.retry,
            "upsert",
            UpsertError::is_retryable,
            || self.target.find_one_and_upsert(collection, &filter, &fields),
        )
        .await;

        let upsert = match upserted {
            Ok(upsert) => upsert,
            Err(e) => {
                let err = self.upsert_error(&key, e);
                return self.fail(index, Some(key), stage, assets, err);
            }
        };
        self.advance(&key, &mut stage);
        self.advance(&key, &mut stage);

        debug!(
            catalog = %self.kind,
            key = %key,
            outcome = upsert.as_str(),
            stage = stage.as_str(),
            "Document synced"
        );
        DocumentReport {
            index,
            key: Some(key),
            result: DocumentResult::Synced { upsert },
            assets,
            images: Some(record.images().clone()),
        }
    }

    fn advance(&self, key: &str, stage: &mut DocumentStage) {
        if let Some(next) = stage.next() {
            *stage = next;
        }
        trace!(catalog = %self.kind, key, stage = stage.as_str(), "Document stage reached");
    }

    /// Resolves every asset slot of the record and rewrites its image URLs.
    async fn cache_assets(&self, record: &mut CatalogRecord) -> Vec<AssetReport> {
        let key = record.natural_key().to_string();
        let mut reports = Vec::with_capacity(self.kind.asset_kinds().len());

        for &kind in self.kind.asset_kinds() {
            let Some(source_url) = record.images().get(kind).map(str::to_string) else {
                reports.push(AssetReport {
                    kind,
                    status: AssetStatus::Absent,
                    url: Some(String::new()),
                });
                record.images_mut().set(kind, "");
                continue;
            };

            let asset_key = AssetKey::derive(&key, kind, &source_url);
            let report = match self
                .cache
                .ensure_cached(&asset_key, &source_url, kind, self.config.force_replace)
                .await
            {
                Ok(outcome) => AssetReport::from_outcome(kind, &outcome),
                Err(e) => {
                    warn!(
                        catalog = %self.kind,
                        key = %asset_key,
                        policy = ?self.config.asset_failure_policy,
                        error = %e,
                        "Asset failed"
                    );
                    self.telemetry.track_exception(&e);
                    let url = match self.config.asset_failure_policy {
                        AssetFailurePolicy::Clear => Some(String::new()),
                        AssetFailurePolicy::KeepPrevious => None,
                    };
                    AssetReport {
                        kind,
                        status: AssetStatus::Failed {
                            error: e.to_string(),
                        },
                        url,
                    }
                }
            };

            if let Some(url) = &report.url {
                record.images_mut().set(kind, url.clone());
            }
            reports.push(report);
        }

        reports
    }

    fn upsert_error(&self, key: &str, source: UpsertError) -> SyncError {
        SyncError::Upsert {
            collection: self.kind.collection(),
            key: key.to_string(),
            source,
        }
    }

    fn fail(
        &self,
        index: usize,
        key: Option<String>,
        stage: DocumentStage,
        assets: Vec<AssetReport>,
        err: SyncError,
    ) -> DocumentReport {
        error!(
            catalog = %self.kind,
            index,
            key = key.as_deref().unwrap_or("-"),
            stage = stage.as_str(),
            error = %err,
            "Document failed"
        );
        self.telemetry.track_exception(&err);

        DocumentReport {
            index,
            key,
            result: DocumentResult::Failed {
                stage,
                error: crate::telemetry::error_chain(&err),
            },
            assets,
            images: None,
        }
    }
}
