// crates/mgnrega-core/src/runtime/mod.rs
// ============================================================================
// Module: MGNREGA Runtime
// Description: Record normalization and the in-memory document store.
// Purpose: Provide the pure pipeline stages and a deterministic test store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold logic that sits between raw API records and the
//! document store. Nothing here performs network I/O.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod normalize;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use normalize::Coercion;
pub use normalize::CoercionLog;
pub use normalize::CoercionPolicy;
pub use normalize::default_financial_year;
pub use normalize::normalize_district;
pub use normalize::normalize_district_logged;
pub use normalize::normalize_districts;
pub use normalize::normalize_metrics;
pub use normalize::normalize_metrics_batch;
pub use normalize::normalize_metrics_logged;
pub use normalize::percentage;
pub use store::InMemoryDocumentStore;
