// crates/mgnrega-sync/src/server.rs
// ============================================================================
// Module: Sync HTTP Server
// Description: axum routes for health, service info, and the cron trigger.
// Purpose: Expose the schedule trigger to the external cron platform.
// Dependencies: mgnrega-config, mgnrega-fetch, axum, tower-http, tokio
// ============================================================================

//! ## Overview
//! Routes:
//! - `GET /health` reports liveness and store reachability.
//! - `GET /` describes the service.
//! - `GET|POST /api/cron/sync` runs the [`SyncTrigger`]. Cron platforms
//!   issue `GET`; both methods behave identically.
//!
//! CORS is driven by `server.allowed_origins` and request bodies are capped
//! at `server.max_body_bytes`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use mgnrega_config::MgnregaConfig;
use mgnrega_config::ServerConfig;
use mgnrega_core::Timestamp;
use mgnrega_fetch::HttpFetcherConfig;
use mgnrega_fetch::HttpRecordFetcher;
use serde_json::json;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing::warn;

use crate::audit::build_audit_sink;
use crate::orchestrator::SyncOrchestrator;
use crate::store::build_store;
use crate::trigger::SyncTrigger;
use crate::trigger::TriggerSettings;

/// Route of the schedule trigger.
pub const SYNC_ROUTE: &str = "/api/cron/sync";

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server hosting the schedule trigger.
pub struct SyncServer {
    /// Server configuration.
    config: ServerConfig,
    /// Shared trigger.
    trigger: Arc<SyncTrigger>,
}

impl SyncServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncServerError`] when configuration is invalid or a
    /// backend cannot be initialized.
    pub fn from_config(config: &MgnregaConfig) -> Result<Self, SyncServerError> {
        let trigger = build_trigger(config)?;
        if config.trigger.secret.is_none() {
            warn!("trigger secret is not configured; every sync request will be rejected");
        }
        Ok(Self {
            config: config.server.clone(),
            trigger: Arc::new(trigger),
        })
    }

    /// Returns the shared trigger.
    #[must_use]
    pub const fn trigger(&self) -> &Arc<SyncTrigger> {
        &self.trigger
    }

    /// Serves requests until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`SyncServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), SyncServerError> {
        let addr: SocketAddr =
            self.config.bind_addr().map_err(|err| SyncServerError::Config(err.to_string()))?;
        let app = build_router(Arc::clone(&self.trigger), &self.config);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| SyncServerError::Transport(format!("http bind failed: {err}")))?;
        info!(%addr, "sync server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| SyncServerError::Transport(format!("http server failed: {err}")))?;
        info!("sync server stopped");
        Ok(())
    }
}

/// Builds the trigger, orchestrator, store, fetcher, and audit sink.
///
/// # Errors
///
/// Returns [`SyncServerError`] when configuration is invalid or a backend
/// cannot be initialized.
pub fn build_trigger(config: &MgnregaConfig) -> Result<SyncTrigger, SyncServerError> {
    config.validate().map_err(|err| SyncServerError::Config(err.to_string()))?;
    let store = build_store(&config.store).map_err(|err| SyncServerError::Init(err.to_string()))?;
    let fetcher = HttpRecordFetcher::new(HttpFetcherConfig {
        base_url: config.source.base_url.clone(),
        api_key: config.source.api_key.clone(),
        timeout: config.source.timeout(),
        page_limit: config.source.page_limit,
        max_response_bytes: config.source.max_response_bytes,
        user_agent: config.source.user_agent.clone(),
    })
    .map_err(|err| SyncServerError::Init(err.to_string()))?;
    let audit = build_audit_sink(&config.audit)
        .map_err(|err| SyncServerError::Init(format!("audit sink: {err}")))?;
    let orchestrator =
        SyncOrchestrator::new(Arc::new(fetcher), store, config.normalize.coercion_policy);
    let settings = TriggerSettings {
        secret: config.trigger.secret.clone(),
        freshness_window: config.trigger.freshness_window(),
        lock_ttl: config.trigger.lock_ttl(),
    };
    Ok(SyncTrigger::new(orchestrator, settings, audit))
}

/// Builds the application router.
pub fn build_router(trigger: Arc<SyncTrigger>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .route(SYNC_ROUTE, get(cron_sync_handler).post(cron_sync_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_cors(&config.allowed_origins))
        .with_state(trigger)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Reports liveness and store reachability.
pub async fn health_handler(State(trigger): State<Arc<SyncTrigger>>) -> Response {
    let store = Arc::clone(trigger.store());
    let reachable = tokio::task::spawn_blocking(move || store.ensure_connected().is_ok())
        .await
        .unwrap_or(false);
    let store_status = if reachable { "ok" } else { "unavailable" };
    let body = json!({
        "status": "OK",
        "timestamp": Timestamp::now().to_rfc3339(),
        "store": store_status,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Describes the service and its routes.
pub async fn root_handler() -> Response {
    let body = json!({
        "message": "MGNREGA Data Sync API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "sync": SYNC_ROUTE,
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Runs the schedule trigger for one cron invocation.
pub async fn cron_sync_handler(
    State(trigger): State<Arc<SyncTrigger>>,
    headers: HeaderMap,
) -> Response {
    let auth_header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    let now = Timestamp::now();
    let outcome = trigger.handle_at(auth_header, now).await;
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    info!(outcome = outcome.label(), status = status.as_u16(), "cron sync handled");
    (status, Json(outcome.body(Timestamp::now()))).into_response()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the CORS layer for the configured origins.
fn build_cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.trim_end_matches('/')).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(values)).allow_credentials(true)
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received shutdown signal");
    } else {
        warn!("failed to install shutdown handler; serving until terminated");
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sync server errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
