// crates/mgnrega-sync/src/audit.rs
// ============================================================================
// Module: Trigger Audit Events
// Description: Structured audit records for trigger decisions and outcomes.
// Purpose: Record who triggered a sync and what happened, without secrets.
// Dependencies: mgnrega-config, serde, sha2, tracing
// ============================================================================

//! ## Overview
//! Every trigger invocation produces one [`TriggerAuditEvent`]. Denied calls
//! carry the denial reason; authorized calls carry a SHA-256 fingerprint
//! prefix of the presented token and the sync outcome. Raw tokens are never
//! recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use mgnrega_config::AuditConfig;
use mgnrega_core::Timestamp;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tracing::info;

/// Hex characters of the token digest kept in audit records.
const FINGERPRINT_HEX_LEN: usize = 16;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit record for one trigger invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Authorization decision (`allow` or `deny`).
    pub decision: &'static str,
    /// Trigger outcome label.
    pub outcome: &'static str,
    /// Denial or failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// SHA-256 fingerprint prefix of the accepted token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_fingerprint: Option<String>,
    /// Records upserted by the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<u64>,
    /// Failed upserts in the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    /// Event time.
    pub timestamp: Timestamp,
}

impl TriggerAuditEvent {
    /// Builds a deny event.
    #[must_use]
    pub fn denied(reason: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            event: "cron_sync",
            decision: "deny",
            outcome: "unauthorized",
            reason: Some(reason.into()),
            token_fingerprint: None,
            processed: None,
            errors: None,
            timestamp,
        }
    }

    /// Builds an allow event for an authorized invocation.
    #[must_use]
    pub fn allowed(
        token: &str,
        outcome: &'static str,
        reason: Option<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            event: "cron_sync",
            decision: "allow",
            outcome,
            reason,
            token_fingerprint: Some(token_fingerprint(token)),
            processed: None,
            errors: None,
            timestamp,
        }
    }

    /// Attaches persistence counters.
    #[must_use]
    pub const fn with_counts(mut self, processed: u64, errors: u64) -> Self {
        self.processed = Some(processed);
        self.errors = Some(errors);
        self
    }
}

/// Returns the first hex characters of the token's SHA-256 digest.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_HEX_LEN);
    for byte in digest.iter().take(FINGERPRINT_HEX_LEN / 2) {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for trigger audit events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &TriggerAuditEvent);
}

/// Audit sink that logs JSON payloads on the `audit` tracing target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &TriggerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            info!(target: "audit", event = %payload);
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// Append-only file handle.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &TriggerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &TriggerAuditEvent) {}
}

/// Builds the audit sink selected by configuration.
///
/// # Errors
///
/// Returns an error when the configured audit file cannot be opened.
pub fn build_audit_sink(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(TracingAuditSink)),
    }
}
