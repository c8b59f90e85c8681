// crates/mgnrega-fetch/src/http.rs
// ============================================================================
// Module: HTTP Record Fetcher
// Description: Bounded GET requests against the open-data resource API.
// Purpose: Turn `{ records: [...] }` responses into raw record batches.
// Dependencies: mgnrega-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! The fetcher issues one GET per endpoint against `{base_url}{path}` with
//! the query parameters `api-key`, `format=json` and `limit`, followed by any
//! caller overrides. Transport failures and non-2xx statuses are returned as
//! [`FetchError`]s; an absent, null or empty `records` field is an empty
//! batch. The API key is never written to logs or error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use mgnrega_core::Endpoint;
use mgnrega_core::FetchError;
use mgnrega_core::RawRecord;
use mgnrega_core::RecordSource;
use reqwest::Client;
use reqwest::Response;
use reqwest::Url;
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "api-key";
/// Query parameter selecting the response format.
const FORMAT_PARAM: &str = "format";
/// Query parameter carrying the page size.
const LIMIT_PARAM: &str = "limit";
/// Envelope field holding the record array.
const RECORDS_FIELD: &str = "records";

/// Configuration for [`HttpRecordFetcher`].
///
/// # Invariants
/// - `timeout` bounds the full request lifecycle, body included.
/// - `max_response_bytes` is a hard upper bound on response bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    /// Base URL; endpoint paths are appended verbatim.
    pub base_url: String,
    /// API key sent as `api-key`; [`RecordSource::check_ready`] fails without it.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Page size sent as `limit`.
    pub page_limit: u32,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// Outbound `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.data.gov.in/resource".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            page_limit: 1000,
            max_response_bytes: 16 * 1024 * 1024,
            user_agent: "MGNREGA-Data-Viz/1.0".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Fetcher
// ============================================================================

/// Record source backed by the open-data HTTP API.
pub struct HttpRecordFetcher {
    /// Fetcher configuration.
    config: HttpFetcherConfig,
    /// Shared HTTP client with timeout and redirect policy applied.
    client: Client,
}

impl HttpRecordFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] when the HTTP client cannot be built.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| FetchError::Config {
                endpoint: "client".to_string(),
                message: format!("http client build failed: {}", err.without_url()),
            })?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the fetcher configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    /// Fetches all raw records from `path` relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failures, non-2xx statuses,
    /// oversized bodies, or responses that are not a JSON record envelope.
    pub async fn fetch_path(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.request_url(path, params)?;
        info!(endpoint = path, "fetching records");
        let response = self.client.get(url).send().await.map_err(|err| transport(path, &err))?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = path, status = status.as_u16(), "fetch returned error status");
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        let body = read_response_limited(path, response, self.config.max_response_bytes).await?;
        let records = decode_records(path, &body)?;
        if records.is_empty() {
            warn!(endpoint = path, "no records found in response");
        } else {
            info!(endpoint = path, records = records.len(), "fetched records");
        }
        Ok(records)
    }

    /// Builds the request URL with default and overriding query parameters.
    fn request_url(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Url, FetchError> {
        let joined = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&joined).map_err(|err| FetchError::Config {
            endpoint: path.to_string(),
            message: format!("invalid request url: {err}"),
        })?;
        let pairs = merge_query(self.default_query(), params);
        debug!(endpoint = path, params = pairs.len(), "built request query");
        url.query_pairs_mut().clear().extend_pairs(pairs);
        Ok(url)
    }

    /// Returns the default query parameters in request order.
    fn default_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(api_key) = &self.config.api_key {
            pairs.push((API_KEY_PARAM.to_string(), api_key.clone()));
        }
        pairs.push((FORMAT_PARAM.to_string(), "json".to_string()));
        pairs.push((LIMIT_PARAM.to_string(), self.config.page_limit.to_string()));
        pairs
    }
}

#[async_trait]
impl RecordSource for HttpRecordFetcher {
    fn check_ready(&self) -> Result<(), FetchError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(FetchError::Config {
                endpoint: "source".to_string(),
                message: "DATA_GOV_API_KEY is not configured".to_string(),
            }),
        }
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<RawRecord>, FetchError> {
        self.fetch_path(endpoint.path(), params).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies caller overrides on top of the defaults, keeping default order.
fn merge_query(
    mut pairs: Vec<(String, String)>,
    overrides: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    for (key, value) in overrides {
        if let Some(existing) = pairs.iter_mut().find(|(name, _)| name == key) {
            existing.1.clone_from(value);
        } else {
            pairs.push((key.clone(), value.clone()));
        }
    }
    pairs
}

/// Maps a reqwest error to a transport failure without the request URL.
fn transport(path: &str, err: &reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    };
    warn!(endpoint = path, error = %message, "fetch transport failure");
    FetchError::Transport {
        endpoint: path.to_string(),
        message,
    }
}

/// Reads the response body while enforcing a byte limit.
async fn read_response_limited(
    path: &str,
    mut response: Response,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let too_large = |actual_bytes: usize| FetchError::TooLarge {
        endpoint: path.to_string(),
        max_bytes,
        actual_bytes,
    };
    if let Some(expected) = response.content_length() {
        let expected = usize::try_from(expected).unwrap_or(usize::MAX);
        if expected > max_bytes {
            return Err(too_large(expected));
        }
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|err| transport(path, &err))? {
        let total = body.len().saturating_add(chunk.len());
        if total > max_bytes {
            return Err(too_large(total));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Extracts the `records` array from a response envelope.
fn decode_records(path: &str, body: &[u8]) -> Result<Vec<RawRecord>, FetchError> {
    let decode = |message: &str| FetchError::Decode {
        endpoint: path.to_string(),
        message: message.to_string(),
    };
    let value: Value =
        serde_json::from_slice(body).map_err(|_| decode("response is not valid json"))?;
    let Value::Object(mut envelope) = value else {
        return Err(decode("response is not a json object"));
    };
    match envelope.remove(RECORDS_FIELD) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(decode("records field is not an array")),
    }
}
