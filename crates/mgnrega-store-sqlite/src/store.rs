// crates/mgnrega-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Document Store
// Description: Durable DocumentStore backed by SQLite WAL.
// Purpose: Upsert canonical documents keyed on their natural identifiers.
// Dependencies: mgnrega-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`DocumentStore`] using `SQLite`. Districts are keyed
//! by `district_id` and metrics by `(district_id, year, month)`; a repeated
//! upsert overwrites the stored document. `last_updated` is mirrored into an
//! indexed integer column so the freshness lookup never decodes documents it
//! does not return. A single-row `sync_lock` table carries the run lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use mgnrega_core::District;
use mgnrega_core::DocumentStore;
use mgnrega_core::LockOutcome;
use mgnrega_core::MetricsKey;
use mgnrega_core::MonthlyMetrics;
use mgnrega_core::StoreError;
use mgnrega_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default database path.
const DEFAULT_STORE_PATH: &str = "data/mgnrega.sqlite";
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum encoded document size accepted by the store.
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default database path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored document could not be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Document exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "document exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a rusqlite error into the store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed document store with a lazily opened connection.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Connection slot; `None` until first use or after a failed health check.
    connection: Arc<Mutex<Option<Connection>>>,
}

impl SqliteDocumentStore {
    /// Validates the configuration without touching the database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the store path is invalid.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    /// Validates the configuration and opens the database immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let store = Self::new(config)?;
        store.connect()?;
        Ok(store)
    }

    /// Returns the configured database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Locks the connection slot.
    fn slot(&self) -> Result<MutexGuard<'_, Option<Connection>>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Opens the connection if the slot is empty or the current one is unhealthy.
    fn connect(&self) -> Result<(), SqliteStoreError> {
        let mut slot = self.slot()?;
        let healthy = slot.as_ref().is_some_and(|connection| {
            connection.query_row("SELECT 1", params![], |row| row.get::<_, i64>(0)).is_ok()
        });
        if !healthy {
            *slot = None;
            *slot = Some(establish(&self.config)?);
        }
        drop(slot);
        Ok(())
    }

    /// Runs `operation` against a connected database.
    fn with_connection<T>(
        &self,
        operation: impl FnOnce(&mut Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut slot = self.slot()?;
        if slot.is_none() {
            *slot = Some(establish(&self.config)?);
        }
        let Some(connection) = slot.as_mut() else {
            return Err(SqliteStoreError::Db("connection unavailable".to_string()));
        };
        let result = operation(connection);
        drop(slot);
        result
    }

    /// Writes a district document.
    fn save_district(&self, district: &District) -> Result<(), SqliteStoreError> {
        if district.district_id.is_empty() {
            return Err(SqliteStoreError::Invalid("district id is empty".to_string()));
        }
        let document = encode_document(district)?;
        let updated_at = Timestamp::now().as_unix_millis();
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO districts (district_id, document, updated_at) VALUES (?1, ?2, \
                     ?3) ON CONFLICT(district_id) DO UPDATE SET document = excluded.document, \
                     updated_at = excluded.updated_at",
                    params![district.district_id, document, updated_at],
                )
                .map_err(db_error)?;
            Ok(())
        })
    }

    /// Writes a metrics document.
    fn save_metrics(&self, metrics: &MonthlyMetrics) -> Result<(), SqliteStoreError> {
        if metrics.district_id.is_empty() {
            return Err(SqliteStoreError::Invalid("metrics district id is empty".to_string()));
        }
        let document = encode_document(metrics)?;
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO monthly_metrics (district_id, year, month, last_updated, \
                     document) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT(district_id, year, month) \
                     DO UPDATE SET last_updated = excluded.last_updated, document = \
                     excluded.document",
                    params![
                        metrics.district_id,
                        metrics.year,
                        metrics.month,
                        metrics.last_updated.as_unix_millis(),
                        document
                    ],
                )
                .map_err(db_error)?;
            Ok(())
        })
    }

    /// Reads the freshest metrics document updated at or after `since`.
    fn query_latest_since(
        &self,
        since: Timestamp,
    ) -> Result<Option<MonthlyMetrics>, SqliteStoreError> {
        let bytes: Option<Vec<u8>> = self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT document FROM monthly_metrics WHERE last_updated >= ?1 ORDER BY \
                     last_updated DESC LIMIT 1",
                    params![since.as_unix_millis()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_error)
        })?;
        bytes.map(|bytes| decode_document(&bytes)).transpose()
    }

    /// Reads a district document by identifier.
    fn query_district(&self, district_id: &str) -> Result<Option<District>, SqliteStoreError> {
        let bytes: Option<Vec<u8>> = self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT document FROM districts WHERE district_id = ?1",
                    params![district_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_error)
        })?;
        bytes.map(|bytes| decode_document(&bytes)).transpose()
    }

    /// Reads a metrics document by composite key.
    fn query_metrics(&self, key: &MetricsKey) -> Result<Option<MonthlyMetrics>, SqliteStoreError> {
        let bytes: Option<Vec<u8>> = self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT document FROM monthly_metrics WHERE district_id = ?1 AND year = ?2 \
                     AND month = ?3",
                    params![key.district_id, key.year, key.month],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_error)
        })?;
        bytes.map(|bytes| decode_document(&bytes)).transpose()
    }

    /// Counts stored districts and metrics.
    fn query_counts(&self) -> Result<(u64, u64), SqliteStoreError> {
        let (districts, metrics): (i64, i64) = self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT (SELECT COUNT(*) FROM districts), (SELECT COUNT(*) FROM \
                     monthly_metrics)",
                    params![],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map_err(db_error)
        })?;
        let districts = u64::try_from(districts)
            .map_err(|_| SqliteStoreError::Corrupt("negative district count".to_string()))?;
        let metrics = u64::try_from(metrics)
            .map_err(|_| SqliteStoreError::Corrupt("negative metrics count".to_string()))?;
        Ok((districts, metrics))
    }

    /// Takes the sync lock inside an immediate transaction.
    fn acquire_lock(
        &self,
        owner: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<LockOutcome, SqliteStoreError> {
        if owner.is_empty() {
            return Err(SqliteStoreError::Invalid("lock owner is empty".to_string()));
        }
        self.with_connection(|connection| {
            let tx = connection
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_error)?;
            let current: Option<(String, i64)> = tx
                .query_row("SELECT owner, expires_at FROM sync_lock WHERE id = 1", params![], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()
                .map_err(db_error)?;
            if let Some((current_owner, current_expiry)) = current
                && current_expiry > now.as_unix_millis()
                && current_owner != owner
            {
                tx.commit().map_err(db_error)?;
                return Ok(LockOutcome::Held {
                    owner: current_owner,
                    expires_at: Timestamp::from_unix_millis(current_expiry),
                });
            }
            tx.execute(
                "INSERT INTO sync_lock (id, owner, expires_at) VALUES (1, ?1, ?2) ON \
                 CONFLICT(id) DO UPDATE SET owner = excluded.owner, expires_at = \
                 excluded.expires_at",
                params![owner, expires_at.as_unix_millis()],
            )
            .map_err(db_error)?;
            tx.commit().map_err(db_error)?;
            Ok(LockOutcome::Acquired)
        })
    }

    /// Deletes the sync lock row when `owner` holds it.
    fn release_lock(&self, owner: &str) -> Result<(), SqliteStoreError> {
        self.with_connection(|connection| {
            connection
                .execute("DELETE FROM sync_lock WHERE id = 1 AND owner = ?1", params![owner])
                .map_err(db_error)?;
            Ok(())
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn ensure_connected(&self) -> Result<(), StoreError> {
        self.connect().map_err(StoreError::from)
    }

    fn upsert_district(&self, district: &District) -> Result<(), StoreError> {
        self.save_district(district).map_err(StoreError::from)
    }

    fn upsert_metrics(&self, metrics: &MonthlyMetrics) -> Result<(), StoreError> {
        self.save_metrics(metrics).map_err(StoreError::from)
    }

    fn latest_metrics_since(
        &self,
        since: Timestamp,
    ) -> Result<Option<MonthlyMetrics>, StoreError> {
        self.query_latest_since(since).map_err(StoreError::from)
    }

    fn load_district(&self, district_id: &str) -> Result<Option<District>, StoreError> {
        self.query_district(district_id).map_err(StoreError::from)
    }

    fn load_metrics(&self, key: &MetricsKey) -> Result<Option<MonthlyMetrics>, StoreError> {
        self.query_metrics(key).map_err(StoreError::from)
    }

    fn record_counts(&self) -> Result<(u64, u64), StoreError> {
        self.query_counts().map_err(StoreError::from)
    }

    fn try_acquire_sync_lock(
        &self,
        owner: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<LockOutcome, StoreError> {
        self.acquire_lock(owner, now, expires_at).map_err(StoreError::from)
    }

    fn release_sync_lock(&self, owner: &str) -> Result<(), StoreError> {
        self.release_lock(owner).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a document and enforces the size limit.
fn encode_document<T: Serialize>(document: &T) -> Result<Vec<u8>, SqliteStoreError> {
    let bytes =
        serde_json::to_vec(document).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Decodes a stored document, failing closed on oversized or malformed rows.
fn decode_document<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SqliteStoreError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DOCUMENT_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    serde_json::from_slice(bytes).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.trim().is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Creates the parent directory, opens the database, and checks the schema.
fn establish(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    ensure_parent_dir(&config.path)?;
    let mut connection = open_connection(config)?;
    initialize_schema(&mut connection)?;
    Ok(connection)
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS districts (
                    district_id TEXT PRIMARY KEY,
                    document BLOB NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS monthly_metrics (
                    district_id TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    last_updated INTEGER NOT NULL,
                    document BLOB NOT NULL,
                    PRIMARY KEY (district_id, year, month)
                );
                CREATE INDEX IF NOT EXISTS idx_monthly_metrics_last_updated
                    ON monthly_metrics (last_updated);
                CREATE TABLE IF NOT EXISTS sync_lock (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    owner TEXT NOT NULL,
                    expires_at INTEGER NOT NULL
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
