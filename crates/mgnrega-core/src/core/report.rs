// crates/mgnrega-core/src/core/report.rs
// ============================================================================
// Module: Sync Reports
// Description: Structured summary of one sync run.
// Purpose: Give callers a success flag, counts, and per-endpoint outcomes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SyncReport`] is the only thing a sync run returns. Failures are
//! represented in the report (`success = false` plus a [`SyncFailure`] kind)
//! instead of escaping as errors, so the trigger can map them to responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::endpoint::Endpoint;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Per-batch persistence counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchCounts {
    /// Records upserted successfully.
    pub synced: u64,
    /// Records whose upsert failed.
    pub errors: u64,
}

impl BatchCounts {
    /// Counts one successful upsert.
    pub const fn record_success(&mut self) {
        self.synced = self.synced.saturating_add(1);
    }

    /// Counts one failed upsert.
    pub const fn record_error(&mut self) {
        self.errors = self.errors.saturating_add(1);
    }
}

/// Result of fetching one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOutcome {
    /// Whether the fetch succeeded.
    pub success: bool,
    /// Raw records returned (zero on failure).
    pub records: usize,
    /// Failure message when the fetch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EndpointOutcome {
    /// Builds a successful outcome.
    #[must_use]
    pub const fn fetched(records: usize) -> Self {
        Self {
            success: true,
            records,
            error: None,
        }
    }

    /// Builds a failed outcome.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            records: 0,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Reason a sync run failed as a whole.
///
/// # Invariants
/// - Variants are stable; the trigger maps each to an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailure {
    /// Required configuration (the API key) is missing or invalid.
    Configuration,
    /// Every endpoint returned nothing usable.
    NoData,
    /// The document store could not be reached.
    Persistence,
}

/// Structured summary of one sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Overall success flag.
    pub success: bool,
    /// Failure classification when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SyncFailure>,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u64,
    /// District upsert counters.
    pub districts: BatchCounts,
    /// Metrics upsert counters.
    pub metrics: BatchCounts,
    /// Fetch outcome per endpoint.
    pub endpoints: BTreeMap<Endpoint, EndpointOutcome>,
    /// Completion time.
    pub timestamp: Timestamp,
}

impl SyncReport {
    /// Builds a failed report with no persistence counters.
    #[must_use]
    pub fn failed(
        failure: SyncFailure,
        message: impl Into<String>,
        duration_ms: u64,
        endpoints: BTreeMap<Endpoint, EndpointOutcome>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            success: false,
            failure: Some(failure),
            error: Some(message.into()),
            duration_ms,
            districts: BatchCounts::default(),
            metrics: BatchCounts::default(),
            endpoints,
            timestamp,
        }
    }

    /// Returns the number of records upserted across both batches.
    #[must_use]
    pub const fn processed(&self) -> u64 {
        self.districts.synced.saturating_add(self.metrics.synced)
    }

    /// Returns the number of failed upserts across both batches.
    #[must_use]
    pub const fn error_count(&self) -> u64 {
        self.districts.errors.saturating_add(self.metrics.errors)
    }
}
