// crates/mgnrega-config/src/lib.rs
// ============================================================================
// Module: MGNREGA Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for mgnrega.toml semantics.
// Dependencies: mgnrega-core, mgnrega-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! `mgnrega-config` defines the configuration for the sync service: the
//! open-data source, the HTTP server, the trigger secret and freshness
//! window, the document store, and the normalizer coercion policy. Files
//! are parsed strictly and validated fail-closed; deployment environment
//! variables are layered on top.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
