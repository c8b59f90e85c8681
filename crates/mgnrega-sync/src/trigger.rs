// crates/mgnrega-sync/src/trigger.rs
// ============================================================================
// Module: Schedule Trigger
// Description: Authenticated, freshness-gated, lock-guarded sync entry point.
// Purpose: Decide whether a scheduled invocation runs a sync and report it.
// Dependencies: mgnrega-core, serde_json, subtle, tokio, tracing
// ============================================================================

//! ## Overview
//! The trigger is the boundary the scheduler calls. In order it:
//! 1. authenticates `Authorization: Bearer <secret>` in constant time,
//! 2. makes sure the document store is reachable,
//! 3. skips the run when a metrics record was updated inside the freshness
//!    window,
//! 4. takes the run-level sync lock so overlapping invocations do not race,
//! 5. runs the orchestrator and releases the lock.
//!
//! The result is a [`TriggerOutcome`] that maps to an HTTP status and a JSON
//! body; transport code stays outside this module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use mgnrega_core::DocumentStore;
use mgnrega_core::LockOutcome;
use mgnrega_core::MonthlyMetrics;
use mgnrega_core::SharedDocumentStore;
use mgnrega_core::StoreError;
use mgnrega_core::SyncFailure;
use mgnrega_core::SyncReport;
use mgnrega_core::Timestamp;
use serde_json::Value;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::info;
use tracing::warn;

use crate::audit::AuditSink;
use crate::audit::TriggerAuditEvent;
use crate::orchestrator::SyncOrchestrator;

/// Maximum accepted `Authorization` header size in bytes.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Trigger settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSettings {
    /// Shared bearer secret; `None` rejects every invocation.
    pub secret: Option<String>,
    /// Recency window that makes a run unnecessary.
    pub freshness_window: Duration,
    /// Expiry of the run-level sync lock.
    pub lock_ttl: Duration,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            secret: None,
            freshness_window: Duration::from_secs(24 * 60 * 60),
            lock_ttl: Duration::from_secs(15 * 60),
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of one trigger invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Missing or wrong bearer token; nothing was fetched or written.
    Unauthorized,
    /// A metrics record inside the freshness window exists.
    UpToDate {
        /// Update time of the freshest record.
        last_updated: Timestamp,
    },
    /// Another invocation holds the sync lock.
    InProgress,
    /// The sync ran and persisted records.
    Completed(SyncReport),
    /// Every endpoint returned nothing usable.
    NoData(SyncReport),
    /// The run failed before or during persistence.
    Failed {
        /// Failure detail.
        message: String,
        /// Run report when the orchestrator produced one.
        report: Option<SyncReport>,
    },
}

impl TriggerOutcome {
    /// Returns the HTTP status code for the outcome.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::UpToDate {
                ..
            }
            | Self::Completed(_) => 200,
            Self::InProgress => 409,
            Self::NoData(_) => 503,
            Self::Failed {
                ..
            } => 500,
        }
    }

    /// Returns a stable outcome label for logs and audit events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::UpToDate {
                ..
            } => "up_to_date",
            Self::InProgress => "in_progress",
            Self::Completed(_) => "completed",
            Self::NoData(_) => "no_data",
            Self::Failed {
                ..
            } => "failed",
        }
    }

    /// Returns the run report, if one was produced.
    #[must_use]
    pub const fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) | Self::NoData(report) => Some(report),
            Self::Failed {
                report, ..
            } => report.as_ref(),
            _ => None,
        }
    }

    /// Builds the JSON response body stamped with `now`.
    #[must_use]
    pub fn body(&self, now: Timestamp) -> Value {
        let timestamp = now.to_rfc3339();
        match self {
            Self::Unauthorized => json!({
                "success": false,
                "error": "Unauthorized",
                "timestamp": timestamp,
            }),
            Self::UpToDate {
                last_updated,
            } => json!({
                "success": true,
                "message": "Data is already up to date",
                "lastUpdated": last_updated.to_rfc3339(),
                "timestamp": timestamp,
            }),
            Self::InProgress => json!({
                "success": false,
                "error": "Sync already in progress",
                "timestamp": timestamp,
            }),
            Self::Completed(report) => json!({
                "success": true,
                "message": "Data synchronization completed",
                "processed": report.processed(),
                "errors": report.error_count(),
                "timestamp": timestamp,
                "report": report_value(report),
            }),
            Self::NoData(report) => json!({
                "success": false,
                "error": "No data available from API",
                "timestamp": timestamp,
                "report": report_value(report),
            }),
            Self::Failed {
                message,
                report,
            } => {
                let mut body = json!({
                    "success": false,
                    "error": "Failed to sync data from API",
                    "message": message,
                    "timestamp": timestamp,
                });
                if let (Some(report), Value::Object(map)) = (report, &mut body) {
                    map.insert("report".to_string(), report_value(report));
                }
                body
            }
        }
    }

    /// Returns the failure detail recorded in audit events.
    fn reason(&self) -> Option<String> {
        match self {
            Self::Failed {
                message, ..
            } => Some(message.clone()),
            Self::NoData(report) => report.error.clone(),
            _ => None,
        }
    }

    /// Maps a finished run to an outcome.
    fn from_report(report: SyncReport) -> Self {
        if report.success {
            return Self::Completed(report);
        }
        if report.failure == Some(SyncFailure::NoData) {
            return Self::NoData(report);
        }
        Self::Failed {
            message: report.error.clone().unwrap_or_else(|| "sync failed".to_string()),
            report: Some(report),
        }
    }
}

// ============================================================================
// SECTION: Trigger
// ============================================================================

/// Schedule trigger wrapping a [`SyncOrchestrator`].
pub struct SyncTrigger {
    /// Orchestrator that performs the run.
    orchestrator: SyncOrchestrator,
    /// Trigger settings.
    settings: TriggerSettings,
    /// Audit sink for invocation records.
    audit: Arc<dyn AuditSink>,
    /// Sequence used to build unique lock owners.
    sequence: AtomicU64,
}

impl SyncTrigger {
    /// Creates a trigger.
    #[must_use]
    pub fn new(
        orchestrator: SyncOrchestrator,
        settings: TriggerSettings,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            orchestrator,
            settings,
            audit,
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the destination store.
    #[must_use]
    pub const fn store(&self) -> &SharedDocumentStore {
        self.orchestrator.store()
    }

    /// Handles an invocation at the current time.
    pub async fn handle(&self, auth_header: Option<&str>) -> TriggerOutcome {
        self.handle_at(auth_header, Timestamp::now()).await
    }

    /// Handles an invocation carrying `auth_header` at time `now`.
    pub async fn handle_at(&self, auth_header: Option<&str>, now: Timestamp) -> TriggerOutcome {
        let token = match self.authorize(auth_header) {
            Ok(token) => token,
            Err(reason) => {
                warn!(reason, "sync trigger rejected");
                self.audit.record(&TriggerAuditEvent::denied(reason, now));
                return TriggerOutcome::Unauthorized;
            }
        };
        let outcome = self.execute(now, true).await;
        let mut event = TriggerAuditEvent::allowed(&token, outcome.label(), outcome.reason(), now);
        if let Some(report) = outcome.report() {
            event = event.with_counts(report.processed(), report.error_count());
        }
        self.audit.record(&event);
        outcome
    }

    /// Runs the gated sync without authentication.
    ///
    /// `respect_freshness = false` skips the freshness gate; the lock is
    /// always taken.
    pub async fn execute(&self, now: Timestamp, respect_freshness: bool) -> TriggerOutcome {
        if let Err(err) = on_store(self.store(), |store| store.ensure_connected()).await {
            warn!(error = %err, "document store unavailable");
            return failed(&err);
        }

        if respect_freshness {
            match self.fresh_record(now).await {
                Ok(Some(record)) => {
                    info!(last_updated = %record.last_updated, "data is already up to date");
                    return TriggerOutcome::UpToDate {
                        last_updated: record.last_updated,
                    };
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "freshness check failed");
                    return failed(&err);
                }
            }
        }

        let owner = self.lock_owner(now);
        let expires_at = now.saturating_add(self.settings.lock_ttl);
        let lock_owner = owner.clone();
        let acquired = on_store(self.store(), move |store| {
            store.try_acquire_sync_lock(&lock_owner, now, expires_at)
        })
        .await;
        match acquired {
            Ok(LockOutcome::Acquired) => {}
            Ok(LockOutcome::Held {
                owner: holder,
                expires_at,
            }) => {
                info!(holder = %holder, expires_at = %expires_at, "sync already in progress");
                return TriggerOutcome::InProgress;
            }
            Err(err) => {
                warn!(error = %err, "sync lock unavailable");
                return failed(&err);
            }
        }

        let report = self.orchestrator.run_full_sync_at(now).await;
        let release_owner = owner.clone();
        if let Err(err) =
            on_store(self.store(), move |store| store.release_sync_lock(&release_owner)).await
        {
            warn!(owner = %owner, error = %err, "sync lock release failed");
        }
        TriggerOutcome::from_report(report)
    }

    /// Returns the freshest metrics record inside the freshness window.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    pub async fn fresh_record(&self, now: Timestamp) -> Result<Option<MonthlyMetrics>, StoreError> {
        let since = now.saturating_sub(self.settings.freshness_window);
        on_store(self.store(), move |store| store.latest_metrics_since(since)).await
    }

    /// Validates the bearer token, returning it on success.
    fn authorize(&self, auth_header: Option<&str>) -> Result<String, &'static str> {
        let secret = self.settings.secret.as_deref().ok_or("trigger secret not configured")?;
        let token = parse_bearer_token(auth_header)?;
        if bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
            Ok(token.to_string())
        } else {
            Err("invalid bearer token")
        }
    }

    /// Builds a lock owner unique to this process and invocation.
    fn lock_owner(&self, now: Timestamp) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("sync-{}-{}-{sequence}", std::process::id(), now.as_unix_millis())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from a `Bearer` authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, &'static str> {
    let header = auth_header.ok_or("missing authorization")?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err("authorization header too large");
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err("invalid authorization header");
    }
    Ok(token)
}

/// Runs a store operation on a blocking thread.
async fn on_store<T, F>(store: &SharedDocumentStore, op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&dyn DocumentStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|err| StoreError::Store(format!("store task failed: {err}")))?
}

/// Builds a failed outcome from a store error.
fn failed(err: &StoreError) -> TriggerOutcome {
    TriggerOutcome::Failed {
        message: err.to_string(),
        report: None,
    }
}

/// Serializes a report for response bodies.
fn report_value(report: &SyncReport) -> Value {
    serde_json::to_value(report).unwrap_or(Value::Null)
}
