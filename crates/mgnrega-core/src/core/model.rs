// crates/mgnrega-core/src/core/model.rs
// ============================================================================
// Module: MGNREGA Data Model
// Description: Canonical district and monthly metrics records.
// Purpose: Define the documents upserted by the sync pipeline.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Two documents are persisted: [`District`], keyed by `districtId`, and
//! [`MonthlyMetrics`], keyed by `(districtId, year, month)`. Both are
//! produced only by the normalizer and are never deleted by the pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Source tag stamped onto every metrics record.
pub const DATA_SOURCE: &str = "data.gov.in";

// ============================================================================
// SECTION: District
// ============================================================================

/// Geographic coordinates for a district.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

/// Canonical district record.
///
/// # Invariants
/// - `district_id` and `district_name` are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    /// Unique district identifier (upsert key).
    pub district_id: String,
    /// District display name.
    pub district_name: String,
    /// State display name.
    #[serde(default)]
    pub state_name: Option<String>,
    /// State code.
    #[serde(default)]
    pub state_code: Option<String>,
    /// Coordinates when at least one axis was supplied.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Population count.
    #[serde(default)]
    pub population: Option<i64>,
    /// Area in square kilometres.
    #[serde(default)]
    pub area: Option<f64>,
}

// ============================================================================
// SECTION: Monthly Metrics
// ============================================================================

/// Composite upsert key for [`MonthlyMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsKey {
    /// District identifier.
    pub district_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
}

/// Monthly employment-programme snapshot for one district.
///
/// # Invariants
/// - `district_id` is non-empty.
/// - Rates are rounded to two decimals and are `0.0` when the denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    /// District identifier.
    pub district_id: String,
    /// District display name when the raw record carried one.
    #[serde(default)]
    pub district_name: Option<String>,
    /// State display name when the raw record carried one.
    #[serde(default)]
    pub state_name: Option<String>,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
    /// Financial year label, e.g. `2024-25`.
    pub financial_year: String,
    /// Registered households.
    pub total_households: u64,
    /// Households that demanded work.
    pub households_demanded_work: u64,
    /// Households that were provided work.
    pub households_provided_work: u64,
    /// Registered persons.
    pub total_persons: u64,
    /// Persons that demanded work.
    pub persons_demanded_work: u64,
    /// Persons that were provided work.
    pub persons_provided_work: u64,
    /// Sanctioned workdays.
    pub total_workdays: u64,
    /// Workdays generated.
    pub workdays_generated: u64,
    /// Wages due.
    pub total_wages: f64,
    /// Wages paid.
    pub wages_paid: f64,
    /// Material cost.
    pub material_cost: f64,
    /// Administrative cost.
    pub administrative_cost: f64,
    /// Households provided work as a percentage of total households.
    pub employment_rate: f64,
    /// Workdays generated as a percentage of total workdays.
    pub work_completion_rate: f64,
    /// Wages paid as a percentage of total wages.
    pub wage_payment_rate: f64,
    /// Source tag.
    pub data_source: String,
    /// Normalization time; drives the trigger freshness gate.
    pub last_updated: Timestamp,
}

impl MonthlyMetrics {
    /// Returns the composite upsert key.
    #[must_use]
    pub fn key(&self) -> MetricsKey {
        MetricsKey {
            district_id: self.district_id.clone(),
            year: self.year,
            month: self.month,
        }
    }
}
