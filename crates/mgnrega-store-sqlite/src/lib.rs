// crates/mgnrega-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Document Store
// Description: Durable DocumentStore backend using SQLite WAL.
// Purpose: Persist districts, monthly metrics, and the sync lock.
// Dependencies: mgnrega-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`DocumentStore`] implementation.
//! Documents are stored as JSON blobs next to the columns that form their
//! upsert key, so writes are single `INSERT ... ON CONFLICT DO UPDATE`
//! statements. The connection is opened lazily and re-checked on every
//! [`DocumentStore::ensure_connected`] call.
//!
//! [`DocumentStore`]: mgnrega_core::DocumentStore
//! [`DocumentStore::ensure_connected`]: mgnrega_core::DocumentStore::ensure_connected

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteDocumentStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
