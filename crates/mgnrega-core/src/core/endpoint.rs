// crates/mgnrega-core/src/core/endpoint.rs
// ============================================================================
// Module: Data API Endpoints
// Description: The four fixed open-data resources pulled on every sync.
// Purpose: Give endpoints stable labels and request paths.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Endpoint identifiers for the district registry and the three metrics feeds.

use serde::Deserialize;
use serde::Serialize;

/// Open-data resource fetched by the sync pipeline.
///
/// # Invariants
/// - Labels and paths are stable; they appear in reports and audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// District registry.
    Districts,
    /// Household and person employment figures.
    Employment,
    /// Workday figures.
    Works,
    /// Wage and cost figures.
    Wages,
}

impl Endpoint {
    /// All endpoints in fetch order.
    pub const ALL: [Self; 4] = [Self::Districts, Self::Employment, Self::Works, Self::Wages];

    /// Returns the request path appended to the configured base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Districts => "/mgnrega-districts",
            Self::Employment => "/mgnrega-employment-data",
            Self::Works => "/mgnrega-works-data",
            Self::Wages => "/mgnrega-wages-data",
        }
    }

    /// Returns a stable label for reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Districts => "districts",
            Self::Employment => "employment",
            Self::Works => "works",
            Self::Wages => "wages",
        }
    }

    /// Returns true when the endpoint contributes to the metrics batch.
    #[must_use]
    pub const fn is_metrics(self) -> bool {
        !matches!(self, Self::Districts)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
