// crates/mgnrega-sync/src/store.rs
// ============================================================================
// Module: Store Wiring
// Description: Builds the configured document store backend.
// Purpose: Keep backend selection out of the trigger and server code.
// Dependencies: mgnrega-config, mgnrega-core, mgnrega-store-sqlite
// ============================================================================

//! ## Overview
//! Maps `[store] type` to a [`SharedDocumentStore`]: `memory` for local runs
//! and tests, `sqlite` for deployments.

use std::sync::Arc;

use mgnrega_config::StoreConfig;
use mgnrega_config::StoreType;
use mgnrega_core::InMemoryDocumentStore;
use mgnrega_core::SharedDocumentStore;
use mgnrega_store_sqlite::SqliteDocumentStore;
use mgnrega_store_sqlite::SqliteStoreError;

/// Builds the document store selected by `config`.
///
/// The `SQLite` store is created lazily; no connection is opened until the
/// first [`mgnrega_core::DocumentStore::ensure_connected`] call.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the configured path is unusable.
pub fn build_store(config: &StoreConfig) -> Result<SharedDocumentStore, SqliteStoreError> {
    let store: SharedDocumentStore = match config.store_type {
        StoreType::Memory => Arc::new(InMemoryDocumentStore::new()),
        StoreType::Sqlite => Arc::new(SqliteDocumentStore::new(config.sqlite_config())?),
    };
    Ok(store)
}
