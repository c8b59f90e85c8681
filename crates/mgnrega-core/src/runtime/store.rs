// crates/mgnrega-core/src/runtime/store.rs
// ============================================================================
// Module: MGNREGA In-Memory Store
// Description: Simple in-memory document store for tests and local runs.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`DocumentStore`]
//! for tests and local demos. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::District;
use crate::core::MetricsKey;
use crate::core::MonthlyMetrics;
use crate::core::Timestamp;
use crate::interfaces::DocumentStore;
use crate::interfaces::LockOutcome;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Sync lock row.
#[derive(Debug, Clone)]
struct LockRow {
    /// Lock owner.
    owner: String,
    /// Lock expiry.
    expires_at: Timestamp,
}

/// Store contents guarded by one mutex.
#[derive(Debug, Default)]
struct Collections {
    /// Districts keyed by identifier.
    districts: BTreeMap<String, District>,
    /// Metrics keyed by composite key.
    metrics: BTreeMap<MetricsKey, MonthlyMetrics>,
    /// Current sync lock.
    lock: Option<LockRow>,
}

/// In-memory document store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    /// Collections protected by a mutex.
    inner: Arc<Mutex<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the collections.
    fn collections(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Store("document store mutex poisoned".to_string()))
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn ensure_connected(&self) -> Result<(), StoreError> {
        self.collections().map(drop)
    }

    fn upsert_district(&self, district: &District) -> Result<(), StoreError> {
        if district.district_id.is_empty() {
            return Err(StoreError::Invalid("district id is empty".to_string()));
        }
        self.collections()?.districts.insert(district.district_id.clone(), district.clone());
        Ok(())
    }

    fn upsert_metrics(&self, metrics: &MonthlyMetrics) -> Result<(), StoreError> {
        if metrics.district_id.is_empty() {
            return Err(StoreError::Invalid("metrics district id is empty".to_string()));
        }
        self.collections()?.metrics.insert(metrics.key(), metrics.clone());
        Ok(())
    }

    fn latest_metrics_since(
        &self,
        since: Timestamp,
    ) -> Result<Option<MonthlyMetrics>, StoreError> {
        let guard = self.collections()?;
        Ok(guard
            .metrics
            .values()
            .filter(|metrics| metrics.last_updated >= since)
            .max_by_key(|metrics| metrics.last_updated)
            .cloned())
    }

    fn load_district(&self, district_id: &str) -> Result<Option<District>, StoreError> {
        Ok(self.collections()?.districts.get(district_id).cloned())
    }

    fn load_metrics(&self, key: &MetricsKey) -> Result<Option<MonthlyMetrics>, StoreError> {
        Ok(self.collections()?.metrics.get(key).cloned())
    }

    fn record_counts(&self) -> Result<(u64, u64), StoreError> {
        let guard = self.collections()?;
        let districts = u64::try_from(guard.districts.len()).unwrap_or(u64::MAX);
        let metrics = u64::try_from(guard.metrics.len()).unwrap_or(u64::MAX);
        drop(guard);
        Ok((districts, metrics))
    }

    fn try_acquire_sync_lock(
        &self,
        owner: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<LockOutcome, StoreError> {
        let mut guard = self.collections()?;
        if let Some(current) = &guard.lock
            && current.expires_at > now
            && current.owner != owner
        {
            return Ok(LockOutcome::Held {
                owner: current.owner.clone(),
                expires_at: current.expires_at,
            });
        }
        guard.lock = Some(LockRow {
            owner: owner.to_string(),
            expires_at,
        });
        drop(guard);
        Ok(LockOutcome::Acquired)
    }

    fn release_sync_lock(&self, owner: &str) -> Result<(), StoreError> {
        let mut guard = self.collections()?;
        if guard.lock.as_ref().is_some_and(|lock| lock.owner == owner) {
            guard.lock = None;
        }
        drop(guard);
        Ok(())
    }
}
