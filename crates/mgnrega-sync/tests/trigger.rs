// crates/mgnrega-sync/tests/trigger.rs
// ============================================================================
// Module: Schedule Trigger Tests
// Description: Authentication, freshness gate, run lock, and response shapes.
// Purpose: Validate the trigger boundary the cron platform calls.
// Dependencies: mgnrega-sync, mgnrega-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`mgnrega_sync::SyncTrigger`] end to end against fake sources:
//! rejected tokens never reach the source, fresh data short-circuits the
//! run, a held lock yields `409`, and each outcome renders the documented
//! JSON body.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use mgnrega_core::LockOutcome;
use mgnrega_core::SharedDocumentStore;
use mgnrega_core::SyncFailure;
use mgnrega_sync::TriggerOutcome;

use crate::common::FakeSource;
use crate::common::FaultyStore;
use crate::common::NOW;
use crate::common::SECRET;
use crate::common::harness;
use crate::common::harness_with_secret;
use crate::common::memory_store;
use crate::common::stored_metrics;

/// Returns a valid bearer header.
fn bearer() -> String {
    format!("Bearer {SECRET}")
}

// ============================================================================
// SECTION: Authentication
// ============================================================================

#[tokio::test]
async fn missing_header_is_unauthorized_without_fetching() {
    let h = harness(FakeSource::sample(), memory_store());

    let outcome = h.trigger.handle_at(None, NOW).await;

    assert_eq!(outcome, TriggerOutcome::Unauthorized);
    assert_eq!(outcome.status_code(), 401);
    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.store.record_counts().unwrap(), (0, 0));
    assert_eq!(outcome.body(NOW)["error"], "Unauthorized");
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let h = harness(FakeSource::sample(), memory_store());

    let outcome = h.trigger.handle_at(Some("Bearer not-the-secret"), NOW).await;

    assert_eq!(outcome, TriggerOutcome::Unauthorized);
    assert_eq!(h.source.calls(), 0);
    let events = h.audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].decision, "deny");
    assert_eq!(events[0].reason.as_deref(), Some("invalid bearer token"));
    assert!(events[0].token_fingerprint.is_none());
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let h = harness(FakeSource::sample(), memory_store());
    let header = format!("Basic {SECRET}");

    let outcome = h.trigger.handle_at(Some(&header), NOW).await;

    assert_eq!(outcome, TriggerOutcome::Unauthorized);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn unconfigured_secret_rejects_every_call() {
    let h = harness_with_secret(FakeSource::sample(), memory_store(), None);

    let outcome = h.trigger.handle_at(Some("Bearer "), NOW).await;
    assert_eq!(outcome, TriggerOutcome::Unauthorized);
    let outcome = h.trigger.handle_at(Some("Bearer anything"), NOW).await;
    assert_eq!(outcome, TriggerOutcome::Unauthorized);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn accepted_token_is_fingerprinted_not_logged() {
    let h = harness(FakeSource::sample(), memory_store());

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;
    assert_eq!(outcome.status_code(), 200);

    let events = h.audit.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.decision, "allow");
    assert_eq!(event.outcome, "completed");
    assert_eq!(event.processed, Some(6));
    let fingerprint = event.token_fingerprint.as_deref().unwrap();
    assert_eq!(fingerprint.len(), 16);
    assert!(!fingerprint.contains(SECRET));
    let payload = serde_json::to_string(event).unwrap();
    assert!(!payload.contains(SECRET));
}

// ============================================================================
// SECTION: Freshness Gate
// ============================================================================

#[tokio::test]
async fn recent_metrics_skip_the_sync() {
    let store = memory_store();
    let updated = NOW.saturating_sub(Duration::from_secs(60 * 60));
    store.upsert_metrics(&stored_metrics("101", updated)).unwrap();
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert_eq!(
        outcome,
        TriggerOutcome::UpToDate {
            last_updated: updated,
        }
    );
    assert_eq!(h.source.calls(), 0);
    let body = outcome.body(NOW);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data is already up to date");
    assert_eq!(body["lastUpdated"], updated.to_rfc3339());
}

#[tokio::test]
async fn stale_metrics_do_not_skip_the_sync() {
    let store = memory_store();
    let updated = NOW.saturating_sub(Duration::from_secs(25 * 60 * 60));
    store.upsert_metrics(&stored_metrics("999", updated)).unwrap();
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert!(matches!(outcome, TriggerOutcome::Completed(_)), "outcome: {outcome:?}");
    assert_eq!(h.source.calls(), 4);
}

#[tokio::test]
async fn execute_can_bypass_the_freshness_gate() {
    let store = memory_store();
    store.upsert_metrics(&stored_metrics("101", NOW)).unwrap();
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.execute(NOW, false).await;

    assert!(matches!(outcome, TriggerOutcome::Completed(_)), "outcome: {outcome:?}");
    assert_eq!(h.source.calls(), 4);
}

// ============================================================================
// SECTION: Run Lock
// ============================================================================

#[tokio::test]
async fn held_lock_reports_in_progress() {
    let store = memory_store();
    let expires = NOW.saturating_add(Duration::from_secs(600));
    assert_eq!(
        store.try_acquire_sync_lock("other-run", NOW, expires).unwrap(),
        LockOutcome::Acquired
    );
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert_eq!(outcome, TriggerOutcome::InProgress);
    assert_eq!(outcome.status_code(), 409);
    assert_eq!(outcome.body(NOW)["error"], "Sync already in progress");
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn expired_lock_is_taken_over() {
    let store = memory_store();
    let earlier = NOW.saturating_sub(Duration::from_secs(3600));
    let expired = NOW.saturating_sub(Duration::from_secs(60));
    store.try_acquire_sync_lock("crashed-run", earlier, expired).unwrap();
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert!(matches!(outcome, TriggerOutcome::Completed(_)), "outcome: {outcome:?}");
}

#[tokio::test]
async fn lock_is_released_after_each_run() {
    let h = harness(FakeSource::sample(), memory_store());

    let first = h.trigger.execute(NOW, false).await;
    let second = h.trigger.execute(NOW, false).await;

    assert!(matches!(first, TriggerOutcome::Completed(_)));
    assert!(matches!(second, TriggerOutcome::Completed(_)));
    let expires = NOW.saturating_add(Duration::from_secs(60));
    assert_eq!(
        h.store.try_acquire_sync_lock("next-run", NOW, expires).unwrap(),
        LockOutcome::Acquired
    );
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

#[tokio::test]
async fn completed_run_reports_counts() {
    let h = harness(FakeSource::sample(), memory_store());

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;
    let body = outcome.body(NOW);

    assert_eq!(outcome.status_code(), 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data synchronization completed");
    assert_eq!(body["processed"], 6);
    assert_eq!(body["errors"], 0);
    assert_eq!(body["timestamp"], NOW.to_rfc3339());
    assert_eq!(body["report"]["districts"]["synced"], 2);
}

#[tokio::test]
async fn empty_api_is_service_unavailable() {
    let h = harness(FakeSource::empty(), memory_store());

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert_eq!(outcome.status_code(), 503);
    let body = outcome.body(NOW);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No data available from API");
}

#[tokio::test]
async fn missing_api_key_is_internal_error() {
    let h = harness(FakeSource::sample().not_ready(), memory_store());

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert_eq!(outcome.status_code(), 500);
    let body = outcome.body(NOW);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to sync data from API");
    assert_eq!(body["message"], "DATA_GOV_API_KEY is not configured");
    assert_eq!(outcome.report().unwrap().failure, Some(SyncFailure::Configuration));
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn unreachable_store_is_internal_error() {
    let store: SharedDocumentStore = Arc::new(FaultyStore::unreachable());
    let h = harness(FakeSource::sample(), store);

    let outcome = h.trigger.handle_at(Some(&bearer()), NOW).await;

    assert_eq!(outcome.status_code(), 500);
    assert!(outcome.report().is_none());
    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.audit.events()[0].outcome, "failed");
}
