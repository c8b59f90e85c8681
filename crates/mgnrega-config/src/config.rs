// crates/mgnrega-config/src/config.rs
// ============================================================================
// Module: MGNREGA Configuration
// Description: Configuration loading and validation for the sync service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: mgnrega-core, mgnrega-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then deployment environment variables override individual fields. The
//! environment is read through a caller-supplied lookup so tests never touch
//! process state. A missing API key is allowed at load time; the sync run
//! reports it as a configuration failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use mgnrega_core::CoercionPolicy;
use mgnrega_store_sqlite::SqliteStoreConfig;
use mgnrega_store_sqlite::SqliteStoreMode;
use mgnrega_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "mgnrega.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MGNREGA_CONFIG";
/// Environment variable overriding `source.base_url`.
pub const BASE_URL_ENV_VAR: &str = "DATA_GOV_BASE_URL";
/// Environment variable overriding `source.api_key`.
pub const API_KEY_ENV_VAR: &str = "DATA_GOV_API_KEY";
/// Environment variable overriding `trigger.secret`.
pub const TRIGGER_SECRET_ENV_VAR: &str = "CRON_SECRET";
/// Environment variable overriding `server.allowed_origins` (comma-separated).
pub const ALLOWED_ORIGINS_ENV_VAR: &str = "FRONTEND_URLS";
/// Environment variable overriding `server.bind`.
pub const BIND_ENV_VAR: &str = "MGNREGA_BIND";
/// Environment variable overriding `store.path`.
pub const STORE_PATH_ENV_VAR: &str = "MGNREGA_STORE_PATH";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of secrets and keys.
pub(crate) const MAX_SECRET_LENGTH: usize = 512;
/// Maximum number of allowed CORS origins.
pub(crate) const MAX_ALLOWED_ORIGINS: usize = 32;
/// Maximum user agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;
/// Default data API base URL.
const DEFAULT_BASE_URL: &str = "https://api.data.gov.in/resource";
/// Default outbound user agent.
const DEFAULT_USER_AGENT: &str = "MGNREGA-Data-Viz/1.0";
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 1_000;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default page size requested from the API.
const DEFAULT_PAGE_LIMIT: u32 = 1_000;
/// Maximum page size requested from the API.
const MAX_PAGE_LIMIT: u32 = 10_000;
/// Default maximum response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Hard cap on the response size limit in bytes.
const MAX_RESPONSE_BYTES_CAP: usize = 256 * 1024 * 1024;
/// Default HTTP bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum inbound request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Default freshness window (24 hours).
const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 24 * 60 * 60;
/// Maximum freshness window (30 days).
const MAX_FRESHNESS_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;
/// Default sync lock TTL (15 minutes).
const DEFAULT_LOCK_TTL_SECS: u64 = 15 * 60;
/// Minimum sync lock TTL.
const MIN_LOCK_TTL_SECS: u64 = 30;
/// Maximum sync lock TTL (1 day).
const MAX_LOCK_TTL_SECS: u64 = 24 * 60 * 60;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the MGNREGA sync service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MgnregaConfig {
    /// Open-data source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Schedule trigger configuration.
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Document store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Normalizer configuration.
    #[serde(default)]
    pub normalize: NormalizeConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl MgnregaConfig {
    /// Loads configuration using the process environment for overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration, reading environment overrides through `lookup`.
    ///
    /// Resolution order: `path`, then `MGNREGA_CONFIG`, then `mgnrega.toml`.
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (resolved, explicit) = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let mut config = if !explicit && !resolved.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved)?
        };
        config.apply_env_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without applying overrides or validation.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies deployment environment overrides.
    ///
    /// Unset or blank variables leave the file value in place.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
        };
        if let Some(value) = read(BASE_URL_ENV_VAR) {
            self.source.base_url = value;
        }
        if let Some(value) = read(API_KEY_ENV_VAR) {
            self.source.api_key = Some(value);
        }
        if let Some(value) = read(TRIGGER_SECRET_ENV_VAR) {
            self.trigger.secret = Some(value);
        }
        if let Some(value) = read(ALLOWED_ORIGINS_ENV_VAR) {
            self.server.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = read(BIND_ENV_VAR) {
            self.server.bind = value;
        }
        if let Some(value) = read(STORE_PATH_ENV_VAR) {
            self.store.path = PathBuf::from(value);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate()?;
        self.server.validate()?;
        self.trigger.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Source Config
// ============================================================================

/// Open-data API source configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Base URL; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as the `api-key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Page size sent as the `limit` query parameter.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Outbound `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow cleartext `http://` base URLs.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: default_user_agent(),
            allow_http: false,
        }
    }
}

impl SourceConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates source configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("source.base_url is invalid: {err}")))?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::Invalid(
                    "source.base_url must use https unless source.allow_http = true".to_string(),
                ));
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "source.base_url has unsupported scheme: {other}"
                )));
            }
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("source.base_url must include a host".to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConfigError::Invalid(
                "source.base_url must not embed credentials".to_string(),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "source.base_url must not include a query or fragment".to_string(),
            ));
        }
        if let Some(api_key) = &self.api_key {
            validate_secret("source.api_key", api_key)?;
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "source.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(ConfigError::Invalid(format!(
                "source.page_limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_CAP {
            return Err(ConfigError::Invalid(format!(
                "source.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_CAP}"
            )));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() || agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "source.user_agent must be 1..={MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed by CORS; `*` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Maximum inbound request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: Vec::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is invalid: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.allowed_origins.len() > MAX_ALLOWED_ORIGINS {
            return Err(ConfigError::Invalid(format!(
                "server.allowed_origins exceeds {MAX_ALLOWED_ORIGINS} entries"
            )));
        }
        for origin in &self.allowed_origins {
            validate_origin(origin)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Trigger Config
// ============================================================================

/// Schedule trigger configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Shared bearer secret; when absent every trigger call is rejected.
    #[serde(default)]
    pub secret: Option<String>,
    /// Skip a sync when metrics were updated within this many seconds.
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,
    /// Expiry of the run-level sync lock in seconds.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            secret: None,
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            lock_ttl_secs: DEFAULT_LOCK_TTL_SECS,
        }
    }
}

impl TriggerConfig {
    /// Returns the freshness window.
    #[must_use]
    pub const fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    /// Returns the sync lock TTL.
    #[must_use]
    pub const fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    /// Validates trigger configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.secret {
            validate_secret("trigger.secret", secret)?;
        }
        if !(1..=MAX_FRESHNESS_WINDOW_SECS).contains(&self.freshness_window_secs) {
            return Err(ConfigError::Invalid(format!(
                "trigger.freshness_window_secs must be between 1 and {MAX_FRESHNESS_WINDOW_SECS}"
            )));
        }
        if !(MIN_LOCK_TTL_SECS..=MAX_LOCK_TTL_SECS).contains(&self.lock_ttl_secs) {
            return Err(ConfigError::Invalid(format!(
                "trigger.lock_ttl_secs must be between {MIN_LOCK_TTL_SECS} and \
                 {MAX_LOCK_TTL_SECS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Document store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local store; contents are lost on exit.
    Memory,
    /// `SQLite` database file.
    #[default]
    Sqlite,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let sqlite = SqliteStoreConfig::default();
        Self {
            store_type: StoreType::default(),
            path: sqlite.path,
            busy_timeout_ms: sqlite.busy_timeout_ms,
            journal_mode: sqlite.journal_mode,
            sync_mode: sqlite.sync_mode,
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_type == StoreType::Sqlite {
            validate_path_string("store.path", &self.path.to_string_lossy())?;
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Normalize and Audit Config
// ============================================================================

/// Normalizer configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Coercion reporting policy.
    #[serde(default)]
    pub coercion_policy: CoercionPolicy,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit events.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines file; events go to the log when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is true when the path was requested.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<(PathBuf, bool), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a secret or key value.
fn validate_secret(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_SECRET_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds {MAX_SECRET_LENGTH} bytes")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    Ok(())
}

/// Validates a CORS origin entry.
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    if origin == "*" {
        return Ok(());
    }
    let url = Url::parse(origin).map_err(|_| {
        ConfigError::Invalid(format!("server.allowed_origins entry is invalid: {origin}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!(
            "server.allowed_origins entry must be an http(s) origin: {origin}"
        )));
    }
    if url.path() != "/" || url.query().is_some() {
        return Err(ConfigError::Invalid(format!(
            "server.allowed_origins entry must not include a path: {origin}"
        )));
    }
    Ok(())
}

/// Returns the default data API base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default page size.
const fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default inbound body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default freshness window.
const fn default_freshness_window_secs() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_SECS
}

/// Returns the default lock TTL.
const fn default_lock_ttl_secs() -> u64 {
    DEFAULT_LOCK_TTL_SECS
}

/// Returns the default store path.
fn default_store_path() -> PathBuf {
    SqliteStoreConfig::default().path
}

/// Returns the default store busy timeout.
fn default_store_busy_timeout_ms() -> u64 {
    SqliteStoreConfig::default().busy_timeout_ms
}

/// Returns whether audit events are enabled by default.
const fn default_audit_enabled() -> bool {
    true
}
