// crates/mgnrega-fetch/src/lib.rs
// ============================================================================
// Module: MGNREGA Fetch
// Description: HTTP record source for the data.gov.in resource API.
// Purpose: Expose the remote fetcher used by the sync orchestrator.
// Dependencies: mgnrega-core, reqwest
// ============================================================================

//! ## Overview
//! [`HttpRecordFetcher`] implements [`mgnrega_core::RecordSource`] over an
//! async `reqwest` client. Each request has a fixed timeout, redirects are
//! not followed, and response bodies are read under a byte limit.

pub mod http;

pub use http::HttpFetcherConfig;
pub use http::HttpRecordFetcher;
