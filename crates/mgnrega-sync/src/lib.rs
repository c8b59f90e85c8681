// crates/mgnrega-sync/src/lib.rs
// ============================================================================
// Module: MGNREGA Sync
// Description: Sync orchestration, schedule trigger, and HTTP surface.
// Purpose: Pull the open-data feeds into the document store on a schedule.
// Dependencies: mgnrega-core, mgnrega-fetch, mgnrega-store-sqlite, axum
// ============================================================================

//! ## Overview
//! [`SyncOrchestrator`] runs one full sync: concurrent fetches, normalization
//! and record-by-record upserts, summarized as a
//! [`mgnrega_core::SyncReport`]. [`SyncTrigger`] wraps it with bearer
//! authentication, a freshness gate and a run-level lock, and
//! [`SyncServer`] exposes the trigger over HTTP.

pub mod audit;
pub mod orchestrator;
pub mod server;
pub mod store;
pub mod trigger;

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::TracingAuditSink;
pub use audit::TriggerAuditEvent;
pub use audit::build_audit_sink;
pub use orchestrator::SyncOrchestrator;
pub use server::SyncServer;
pub use server::SyncServerError;
pub use server::build_router;
pub use server::build_trigger;
pub use store::build_store;
pub use trigger::SyncTrigger;
pub use trigger::TriggerOutcome;
pub use trigger::TriggerSettings;
