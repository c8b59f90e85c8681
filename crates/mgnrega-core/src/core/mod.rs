// crates/mgnrega-core/src/core/mod.rs
// ============================================================================
// Module: MGNREGA Core Types
// Description: Canonical records, sync reports, and time values.
// Purpose: Define the shapes persisted by the sync pipeline.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types are plain serializable records. Field names serialize in
//! camelCase so persisted documents match what the dashboard read API
//! serves.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod endpoint;
pub mod model;
pub mod report;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use endpoint::Endpoint;
pub use model::Coordinates;
pub use model::DATA_SOURCE;
pub use model::District;
pub use model::MetricsKey;
pub use model::MonthlyMetrics;
pub use report::BatchCounts;
pub use report::EndpointOutcome;
pub use report::SyncFailure;
pub use report::SyncReport;
pub use time::Timestamp;
