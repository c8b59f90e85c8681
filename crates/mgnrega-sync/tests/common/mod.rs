// crates/mgnrega-sync/tests/common/mod.rs
// ============================================================================
// Module: Sync Test Helpers
// Description: Fake record sources, faulty stores, and recording audit sinks.
// Purpose: Drive the orchestrator and trigger without network or disk.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers may panic on poisoned state."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use mgnrega_core::CoercionPolicy;
use mgnrega_core::District;
use mgnrega_core::DocumentStore;
use mgnrega_core::Endpoint;
use mgnrega_core::FetchError;
use mgnrega_core::InMemoryDocumentStore;
use mgnrega_core::LockOutcome;
use mgnrega_core::MetricsKey;
use mgnrega_core::MonthlyMetrics;
use mgnrega_core::RawRecord;
use mgnrega_core::RecordSource;
use mgnrega_core::SharedDocumentStore;
use mgnrega_core::StoreError;
use mgnrega_core::Timestamp;
use mgnrega_sync::AuditSink;
use mgnrega_sync::SyncOrchestrator;
use mgnrega_sync::SyncTrigger;
use mgnrega_sync::TriggerAuditEvent;
use mgnrega_sync::TriggerSettings;
use serde_json::json;

/// Shared secret used by trigger tests.
pub const SECRET: &str = "cron-secret-token";

/// Fixed test clock: 2026-03-15T12:00:00Z.
pub const NOW: Timestamp = Timestamp::from_unix_millis(1_773_576_000_000);

// ============================================================================
// SECTION: Record Source
// ============================================================================

/// Scripted record source that counts fetch calls.
pub struct FakeSource {
    /// Records returned per endpoint; missing endpoints return empty batches.
    responses: BTreeMap<Endpoint, Vec<RawRecord>>,
    /// Endpoints that fail with a transport error.
    failing: BTreeSet<Endpoint>,
    /// Whether `check_ready` succeeds.
    ready: bool,
    /// Number of fetch calls observed.
    calls: AtomicUsize,
}

impl FakeSource {
    /// Creates a ready source with no data.
    pub fn empty() -> Self {
        Self {
            responses: BTreeMap::new(),
            failing: BTreeSet::new(),
            ready: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a ready source serving the sample data set.
    pub fn sample() -> Self {
        Self::empty()
            .with(Endpoint::Districts, sample_districts())
            .with(Endpoint::Employment, vec![employment_record("101", 100, 40)])
            .with(Endpoint::Works, vec![works_record("101"), works_record("102")])
            .with(Endpoint::Wages, vec![json!({"district_id": "102", "year": 2025, "month": 11})])
    }

    /// Sets the records returned for `endpoint`.
    pub fn with(mut self, endpoint: Endpoint, records: Vec<RawRecord>) -> Self {
        self.responses.insert(endpoint, records);
        self
    }

    /// Makes `endpoint` fail.
    pub fn failing(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Makes `check_ready` fail like a missing API key.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Returns the number of fetch calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    fn check_ready(&self) -> Result<(), FetchError> {
        if self.ready {
            Ok(())
        } else {
            Err(FetchError::Config {
                endpoint: "source".to_string(),
                message: "DATA_GOV_API_KEY is not configured".to_string(),
            })
        }
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        _params: &BTreeMap<String, String>,
    ) -> Result<Vec<RawRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&endpoint) {
            return Err(FetchError::Transport {
                endpoint: endpoint.path().to_string(),
                message: "connection failed".to_string(),
            });
        }
        Ok(self.responses.get(&endpoint).cloned().unwrap_or_default())
    }
}

/// Two raw districts plus one unusable record.
pub fn sample_districts() -> Vec<RawRecord> {
    vec![
        json!({"district_id": "101", "district_name": "Pune", "state_name": "Maharashtra"}),
        json!({"districtId": "102", "districtName": "Nashik", "latitude": "20.0"}),
        json!({"district_name": "No Identifier"}),
    ]
}

/// Raw employment record for November 2025.
pub fn employment_record(district_id: &str, households: u64, provided: u64) -> RawRecord {
    json!({
        "district_id": district_id,
        "year": 2025,
        "month": 11,
        "total_households": households,
        "households_provided_work": provided,
    })
}

/// Raw works record for October 2025.
pub fn works_record(district_id: &str) -> RawRecord {
    json!({
        "district_id": district_id,
        "year": "2025",
        "month": "10",
        "total_workdays": "500",
        "workdays_generated": "250",
    })
}

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Store wrapper that injects failures.
pub struct FaultyStore {
    /// Backing store.
    pub inner: InMemoryDocumentStore,
    /// Fail `ensure_connected`.
    pub unreachable: bool,
    /// District ids whose upserts fail.
    pub failing_districts: BTreeSet<String>,
}

impl FaultyStore {
    /// Creates a store that cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            unreachable: true,
            failing_districts: BTreeSet::new(),
        }
    }

    /// Creates a store rejecting upserts for `district_id`.
    pub fn rejecting(district_id: &str) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            unreachable: false,
            failing_districts: BTreeSet::from([district_id.to_string()]),
        }
    }
}

impl DocumentStore for FaultyStore {
    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.unreachable {
            return Err(StoreError::Io("connection refused".to_string()));
        }
        self.inner.ensure_connected()
    }

    fn upsert_district(&self, district: &District) -> Result<(), StoreError> {
        if self.failing_districts.contains(&district.district_id) {
            return Err(StoreError::Store("write rejected".to_string()));
        }
        self.inner.upsert_district(district)
    }

    fn upsert_metrics(&self, metrics: &MonthlyMetrics) -> Result<(), StoreError> {
        if self.failing_districts.contains(&metrics.district_id) {
            return Err(StoreError::Store("write rejected".to_string()));
        }
        self.inner.upsert_metrics(metrics)
    }

    fn latest_metrics_since(
        &self,
        since: Timestamp,
    ) -> Result<Option<MonthlyMetrics>, StoreError> {
        self.inner.latest_metrics_since(since)
    }

    fn load_district(&self, district_id: &str) -> Result<Option<District>, StoreError> {
        self.inner.load_district(district_id)
    }

    fn load_metrics(&self, key: &MetricsKey) -> Result<Option<MonthlyMetrics>, StoreError> {
        self.inner.load_metrics(key)
    }

    fn record_counts(&self) -> Result<(u64, u64), StoreError> {
        self.inner.record_counts()
    }

    fn try_acquire_sync_lock(
        &self,
        owner: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<LockOutcome, StoreError> {
        self.inner.try_acquire_sync_lock(owner, now, expires_at)
    }

    fn release_sync_lock(&self, owner: &str) -> Result<(), StoreError> {
        self.inner.release_sync_lock(owner)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<TriggerAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<TriggerAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &TriggerAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Test harness bundling a trigger with handles to its collaborators.
pub struct Harness {
    /// Trigger under test.
    pub trigger: SyncTrigger,
    /// Source handle for call counting.
    pub source: Arc<FakeSource>,
    /// Store handle for inspection.
    pub store: SharedDocumentStore,
    /// Audit handle for inspection.
    pub audit: Arc<RecordingAuditSink>,
}

/// Builds a trigger over `source` and `store` with the test secret.
pub fn harness(source: FakeSource, store: SharedDocumentStore) -> Harness {
    harness_with_secret(source, store, Some(SECRET))
}

/// Builds a trigger with an explicit secret.
pub fn harness_with_secret(
    source: FakeSource,
    store: SharedDocumentStore,
    secret: Option<&str>,
) -> Harness {
    let source = Arc::new(source);
    let audit = Arc::new(RecordingAuditSink::default());
    let orchestrator = SyncOrchestrator::new(
        Arc::clone(&source) as Arc<dyn RecordSource>,
        Arc::clone(&store),
        CoercionPolicy::Warn,
    );
    let settings = TriggerSettings {
        secret: secret.map(str::to_string),
        freshness_window: Duration::from_secs(24 * 60 * 60),
        lock_ttl: Duration::from_secs(15 * 60),
    };
    let trigger =
        SyncTrigger::new(orchestrator, settings, Arc::clone(&audit) as Arc<dyn AuditSink>);
    Harness {
        trigger,
        source,
        store,
        audit,
    }
}

/// Returns a new shared in-memory store.
pub fn memory_store() -> SharedDocumentStore {
    Arc::new(InMemoryDocumentStore::new())
}

/// Builds a stored metrics record updated at `last_updated`.
pub fn stored_metrics(district_id: &str, last_updated: Timestamp) -> MonthlyMetrics {
    mgnrega_core::normalize_metrics(&employment_record(district_id, 10, 5), last_updated)
        .expect("sample metrics normalize")
}
