// crates/mgnrega-core/src/lib.rs
// ============================================================================
// Module: MGNREGA Core Library
// Description: Public API surface for the MGNREGA sync core.
// Purpose: Expose the data model, interfaces, and normalization runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The core crate owns the canonical `District` and `MonthlyMetrics` shapes,
//! the normalizer that coerces raw government API records into them, and the
//! interfaces the sync pipeline talks to (record sources and document
//! stores). It never performs network or disk I/O itself and never reads the
//! wall clock; hosts pass timestamps in explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::DocumentStore;
pub use interfaces::FetchError;
pub use interfaces::LockOutcome;
pub use interfaces::RawRecord;
pub use interfaces::RecordSource;
pub use interfaces::SharedDocumentStore;
pub use interfaces::StoreError;
pub use runtime::Coercion;
pub use runtime::CoercionLog;
pub use runtime::CoercionPolicy;
pub use runtime::InMemoryDocumentStore;
pub use runtime::default_financial_year;
pub use runtime::normalize_district;
pub use runtime::normalize_district_logged;
pub use runtime::normalize_districts;
pub use runtime::normalize_metrics;
pub use runtime::normalize_metrics_batch;
pub use runtime::normalize_metrics_logged;
pub use runtime::percentage;
