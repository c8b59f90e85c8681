// crates/mgnrega-core/src/interfaces/mod.rs
// ============================================================================
// Module: MGNREGA Interfaces
// Description: Seams between the sync pipeline and its I/O backends.
// Purpose: Let the orchestrator run against HTTP/SQLite or in-memory fakes.
// Dependencies: async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Two seams exist. [`RecordSource`] yields raw records for an endpoint and
//! is async because it performs network I/O. [`DocumentStore`] persists
//! normalized records and is blocking, mirroring embedded database drivers;
//! async callers run it on a blocking thread.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::District;
use crate::core::Endpoint;
use crate::core::MetricsKey;
use crate::core::MonthlyMetrics;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Record Source
// ============================================================================

/// Raw record as returned by the open-data API.
pub type RawRecord = serde_json::Value;

/// Fetch failures. Every variant names the endpoint that failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Source is not configured (for example, no API key).
    #[error("fetch config error for {endpoint}: {message}")]
    Config {
        /// Endpoint label or path.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Connection, timeout, or body read failure.
    #[error("fetch transport error for {endpoint}: {message}")]
    Transport {
        /// Endpoint label or path.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Non-2xx response.
    #[error("fetch failed for {endpoint}: http status {status}")]
    Status {
        /// Endpoint label or path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },
    /// Response body was not the expected JSON envelope.
    #[error("fetch decode error for {endpoint}: {message}")]
    Decode {
        /// Endpoint label or path.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Response body exceeded the configured limit.
    #[error("fetch response too large for {endpoint}: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Endpoint label or path.
        endpoint: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Bytes observed before aborting.
        actual_bytes: usize,
    },
}

impl FetchError {
    /// Returns the endpoint label carried by the error.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Config {
                endpoint, ..
            }
            | Self::Transport {
                endpoint, ..
            }
            | Self::Status {
                endpoint, ..
            }
            | Self::Decode {
                endpoint, ..
            }
            | Self::TooLarge {
                endpoint, ..
            } => endpoint,
        }
    }
}

/// Source of raw records for the sync pipeline.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Verifies the source can issue requests at all.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] when required settings are missing.
    fn check_ready(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Fetches all raw records for an endpoint.
    ///
    /// `params` are merged over the source's default query parameters.
    /// An empty or absent record list is `Ok(vec![])`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failures or non-2xx responses.
    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<RawRecord>, FetchError>;
}

// ============================================================================
// SECTION: Document Store
// ============================================================================

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("document store io error: {0}")]
    Io(String),
    /// Stored data is corrupted.
    #[error("document store corruption: {0}")]
    Corrupt(String),
    /// Stored schema version is incompatible.
    #[error("document store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input or stored data is invalid.
    #[error("document store invalid data: {0}")]
    Invalid(String),
    /// Backend reported an error.
    #[error("document store error: {0}")]
    Store(String),
}

/// Result of a sync lock acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// Lock acquired by the caller.
    Acquired,
    /// Another owner holds an unexpired lock.
    Held {
        /// Current lock owner.
        owner: String,
        /// Expiry of the current lock.
        expires_at: Timestamp,
    },
}

/// Persistence backend for normalized records.
///
/// # Invariants
/// - Upserts are last-write-wins on the record key.
/// - At most one lock owner exists at a time; expired locks may be taken over.
pub trait DocumentStore: Send + Sync {
    /// Opens the backend if needed. Calling it repeatedly is cheap and safe.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be reached.
    fn ensure_connected(&self) -> Result<(), StoreError>;

    /// Inserts or replaces a district keyed by `district_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_district(&self, district: &District) -> Result<(), StoreError>;

    /// Inserts or replaces metrics keyed by `(district_id, year, month)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_metrics(&self, metrics: &MonthlyMetrics) -> Result<(), StoreError>;

    /// Returns the most recently updated metrics record with
    /// `last_updated >= since`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn latest_metrics_since(&self, since: Timestamp)
    -> Result<Option<MonthlyMetrics>, StoreError>;

    /// Loads a district by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn load_district(&self, district_id: &str) -> Result<Option<District>, StoreError>;

    /// Loads a metrics record by composite key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn load_metrics(&self, key: &MetricsKey) -> Result<Option<MonthlyMetrics>, StoreError>;

    /// Returns `(district_count, metrics_count)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn record_counts(&self) -> Result<(u64, u64), StoreError>;

    /// Attempts to take the run-level sync lock until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock row cannot be read or written.
    fn try_acquire_sync_lock(
        &self,
        owner: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<LockOutcome, StoreError>;

    /// Releases the sync lock if `owner` still holds it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock row cannot be written.
    fn release_sync_lock(&self, owner: &str) -> Result<(), StoreError>;
}

/// Shared handle to a document store.
pub type SharedDocumentStore = Arc<dyn DocumentStore>;
