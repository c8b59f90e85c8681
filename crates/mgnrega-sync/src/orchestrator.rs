// crates/mgnrega-sync/src/orchestrator.rs
// ============================================================================
// Module: Sync Orchestrator
// Description: One full fetch, normalize, and persist pass.
// Purpose: Turn four independent endpoint fetches into a single SyncReport.
// Dependencies: mgnrega-core, tokio, tracing
// ============================================================================

//! ## Overview
//! A run fetches the four endpoints concurrently and settles each one
//! independently: a failed endpoint contributes an empty batch and a failed
//! [`EndpointOutcome`]. Districts and the concatenated metrics feeds are
//! normalized separately and then upserted one record at a time on a
//! blocking thread. A failed upsert is counted and the batch continues.
//!
//! Run-level failures (missing API key, no data, unreachable store) are
//! reported through [`SyncReport::failed`]; nothing escapes as an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use mgnrega_core::BatchCounts;
use mgnrega_core::CoercionLog;
use mgnrega_core::CoercionPolicy;
use mgnrega_core::District;
use mgnrega_core::DocumentStore;
use mgnrega_core::Endpoint;
use mgnrega_core::EndpointOutcome;
use mgnrega_core::FetchError;
use mgnrega_core::MonthlyMetrics;
use mgnrega_core::RawRecord;
use mgnrega_core::RecordSource;
use mgnrega_core::SharedDocumentStore;
use mgnrega_core::StoreError;
use mgnrega_core::SyncFailure;
use mgnrega_core::SyncReport;
use mgnrega_core::Timestamp;
use mgnrega_core::normalize_districts;
use mgnrega_core::normalize_metrics_batch;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Message reported when every endpoint came back empty.
pub const NO_DATA_MESSAGE: &str = "No data received from API";

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Runs full syncs from a record source into a document store.
#[derive(Clone)]
pub struct SyncOrchestrator {
    /// Record source for the four endpoints.
    source: Arc<dyn RecordSource>,
    /// Destination store.
    store: SharedDocumentStore,
    /// Coercion reporting policy.
    policy: CoercionPolicy,
}

impl SyncOrchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        source: Arc<dyn RecordSource>,
        store: SharedDocumentStore,
        policy: CoercionPolicy,
    ) -> Self {
        Self {
            source,
            store,
            policy,
        }
    }

    /// Returns the destination store.
    #[must_use]
    pub const fn store(&self) -> &SharedDocumentStore {
        &self.store
    }

    /// Runs one full sync stamped with the current time.
    pub async fn run_full_sync(&self) -> SyncReport {
        self.run_full_sync_at(Timestamp::now()).await
    }

    /// Runs one full sync; `now` stamps normalized records and the report.
    pub async fn run_full_sync_at(&self, now: Timestamp) -> SyncReport {
        let started = Instant::now();
        info!("starting full data synchronization");

        if let Err(err) = self.source.check_ready() {
            error!(error = %err, "sync source is not ready");
            return SyncReport::failed(
                SyncFailure::Configuration,
                config_message(&err),
                elapsed_ms(started),
                BTreeMap::new(),
                now,
            );
        }

        let fetched = self.fetch_all().await;
        let mut log = CoercionLog::new();
        let districts = normalize_districts(&fetched.districts, &mut log);
        let metrics = normalize_metrics_batch(&fetched.metrics, now, &mut log);
        info!(
            districts = districts.len(),
            metrics = metrics.len(),
            coerced_fields = log.len(),
            "normalized fetched records"
        );
        if self.policy == CoercionPolicy::Warn {
            for entry in log.entries() {
                warn!(
                    record_id = entry.record_id.as_deref().unwrap_or("-"),
                    field = entry.field,
                    raw = %entry.raw,
                    "coerced malformed field"
                );
            }
        }

        if districts.is_empty() && metrics.is_empty() {
            warn!("sync produced no usable records");
            return SyncReport::failed(
                SyncFailure::NoData,
                NO_DATA_MESSAGE,
                elapsed_ms(started),
                fetched.outcomes,
                now,
            );
        }

        let persisted = match persist(Arc::clone(&self.store), districts, metrics).await {
            Ok(persisted) => persisted,
            Err(err) => {
                error!(error = %err, "document store unavailable");
                return SyncReport::failed(
                    SyncFailure::Persistence,
                    err.to_string(),
                    elapsed_ms(started),
                    fetched.outcomes,
                    now,
                );
            }
        };

        let report = SyncReport {
            success: true,
            failure: None,
            error: None,
            duration_ms: elapsed_ms(started),
            districts: persisted.districts,
            metrics: persisted.metrics,
            endpoints: fetched.outcomes,
            timestamp: now,
        };
        info!(
            duration_ms = report.duration_ms,
            districts_synced = report.districts.synced,
            districts_errors = report.districts.errors,
            metrics_synced = report.metrics.synced,
            metrics_errors = report.metrics.errors,
            "data synchronization completed"
        );
        report
    }

    /// Fetches every endpoint concurrently and settles each independently.
    async fn fetch_all(&self) -> FetchedBatches {
        let params = BTreeMap::new();
        let (districts, employment, works, wages) = tokio::join!(
            self.source.fetch(Endpoint::Districts, &params),
            self.source.fetch(Endpoint::Employment, &params),
            self.source.fetch(Endpoint::Works, &params),
            self.source.fetch(Endpoint::Wages, &params),
        );
        let mut batches = FetchedBatches::default();
        for (endpoint, result) in [
            (Endpoint::Districts, districts),
            (Endpoint::Employment, employment),
            (Endpoint::Works, works),
            (Endpoint::Wages, wages),
        ] {
            batches.settle(endpoint, result);
        }
        info!(
            districts = batches.districts.len(),
            metrics = batches.metrics.len(),
            "data fetch results"
        );
        batches
    }
}

// ============================================================================
// SECTION: Fetch Settlement
// ============================================================================

/// Raw batches and per-endpoint outcomes from one fan-out.
#[derive(Default)]
struct FetchedBatches {
    /// Raw district registry records.
    districts: Vec<RawRecord>,
    /// Employment, works, and wages records in endpoint order.
    metrics: Vec<RawRecord>,
    /// Outcome per endpoint.
    outcomes: BTreeMap<Endpoint, EndpointOutcome>,
}

impl FetchedBatches {
    /// Records one endpoint result; failures contribute no records.
    fn settle(&mut self, endpoint: Endpoint, result: Result<Vec<RawRecord>, FetchError>) {
        match result {
            Ok(records) => {
                self.outcomes.insert(endpoint, EndpointOutcome::fetched(records.len()));
                if endpoint.is_metrics() {
                    self.metrics.extend(records);
                } else {
                    self.districts.extend(records);
                }
            }
            Err(err) => {
                warn!(endpoint = endpoint.as_str(), error = %err, "endpoint fetch failed");
                self.outcomes.insert(endpoint, EndpointOutcome::failed(err.to_string()));
            }
        }
    }
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// Counters from one persistence pass.
struct Persisted {
    /// District counters.
    districts: BatchCounts,
    /// Metrics counters.
    metrics: BatchCounts,
}

/// Upserts both batches on a blocking thread.
async fn persist(
    store: SharedDocumentStore,
    districts: Vec<District>,
    metrics: Vec<MonthlyMetrics>,
) -> Result<Persisted, StoreError> {
    tokio::task::spawn_blocking(move || -> Result<Persisted, StoreError> {
        store.ensure_connected()?;
        Ok(Persisted {
            districts: sync_districts(store.as_ref(), &districts),
            metrics: sync_metrics(store.as_ref(), &metrics),
        })
    })
    .await
    .map_err(|err| StoreError::Store(format!("persistence task failed: {err}")))?
}

/// Upserts districts one by one, counting failures.
fn sync_districts(store: &dyn DocumentStore, districts: &[District]) -> BatchCounts {
    info!(count = districts.len(), "syncing districts");
    let mut counts = BatchCounts::default();
    for district in districts {
        match store.upsert_district(district) {
            Ok(()) => counts.record_success(),
            Err(err) => {
                error!(district_id = %district.district_id, error = %err, "district upsert failed");
                counts.record_error();
            }
        }
    }
    info!(synced = counts.synced, errors = counts.errors, "districts sync completed");
    counts
}

/// Upserts metrics one by one, counting failures.
fn sync_metrics(store: &dyn DocumentStore, metrics: &[MonthlyMetrics]) -> BatchCounts {
    info!(count = metrics.len(), "syncing metrics");
    let mut counts = BatchCounts::default();
    for record in metrics {
        match store.upsert_metrics(record) {
            Ok(()) => counts.record_success(),
            Err(err) => {
                error!(
                    district_id = %record.district_id,
                    year = record.year,
                    month = record.month,
                    error = %err,
                    "metrics upsert failed"
                );
                counts.record_error();
            }
        }
    }
    info!(synced = counts.synced, errors = counts.errors, "metrics sync completed");
    counts
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the configuration message without the endpoint prefix.
fn config_message(err: &FetchError) -> String {
    match err {
        FetchError::Config {
            message, ..
        } => message.clone(),
        other => other.to_string(),
    }
}

/// Returns elapsed milliseconds since `started`.
fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
