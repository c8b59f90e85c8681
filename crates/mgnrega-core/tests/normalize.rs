// crates/mgnrega-core/tests/normalize.rs
// ============================================================================
// Module: Record Normalizer Tests
// Description: Field mapping, coercion, and derived rate behavior.
// Purpose: Validate that raw API records normalize without ever failing.
// Dependencies: mgnrega-core, serde_json
// ============================================================================
//! ## Overview
//! Covers snake_case/camelCase lookup, dropping of unidentifiable records,
//! default substitution for malformed numbers, and rate computation.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use mgnrega_core::CoercionLog;
use mgnrega_core::DATA_SOURCE;
use mgnrega_core::Timestamp;
use mgnrega_core::normalize_district;
use mgnrega_core::normalize_districts;
use mgnrega_core::normalize_metrics;
use mgnrega_core::normalize_metrics_batch;
use mgnrega_core::normalize_metrics_logged;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn now() -> Timestamp {
    Timestamp::parse_rfc3339("2025-03-15T10:00:00Z").expect("timestamp")
}

// ============================================================================
// SECTION: District Tests
// ============================================================================

#[test]
fn district_reads_snake_case_fields() {
    let raw = json!({
        "district_id": "D1",
        "district_name": "Pune",
        "state_name": "Maharashtra",
        "state_code": "MH",
        "latitude": "18.52",
        "longitude": 73.85,
        "population": "9429408",
        "area": "15643.0"
    });
    let district = normalize_district(&raw).expect("district");
    assert_eq!(district.district_id, "D1");
    assert_eq!(district.district_name, "Pune");
    assert_eq!(district.state_name.as_deref(), Some("Maharashtra"));
    assert_eq!(district.state_code.as_deref(), Some("MH"));
    let coordinates = district.coordinates.expect("coordinates");
    assert_eq!(coordinates.latitude, Some(18.52));
    assert_eq!(coordinates.longitude, Some(73.85));
    assert_eq!(district.population, Some(9_429_408));
    assert_eq!(district.area, Some(15643.0));
}

#[test]
fn district_reads_camel_case_fields() {
    let raw = json!({"districtId": 42, "districtName": "Nashik", "stateName": "Maharashtra"});
    let district = normalize_district(&raw).expect("district");
    assert_eq!(district.district_id, "42");
    assert_eq!(district.district_name, "Nashik");
    assert_eq!(district.state_name.as_deref(), Some("Maharashtra"));
    assert!(district.coordinates.is_none());
    assert!(district.population.is_none());
}

#[test]
fn district_without_id_or_name_is_dropped() {
    assert!(normalize_district(&json!({"district_name": "Pune"})).is_none());
    assert!(normalize_district(&json!({"district_id": "D1"})).is_none());
    assert!(normalize_district(&json!({"district_id": "", "district_name": "Pune"})).is_none());
    assert!(normalize_district(&json!("not an object")).is_none());
}

#[test]
fn district_malformed_geo_fields_become_none() {
    let raw = json!({
        "district_id": "D1",
        "district_name": "Pune",
        "latitude": "north",
        "population": "many",
        "area": {"value": 3}
    });
    let mut log = CoercionLog::new();
    let district = mgnrega_core::normalize_district_logged(&raw, &mut log).expect("district");
    assert!(district.coordinates.is_none());
    assert!(district.population.is_none());
    assert!(district.area.is_none());
    let fields: Vec<&str> = log.entries().iter().map(|entry| entry.field).collect();
    assert_eq!(fields, vec!["latitude", "population", "area"]);
}

#[test]
fn district_zero_coordinates_are_kept() {
    let raw = json!({"district_id": "D1", "district_name": "Null Island", "latitude": 0, "longitude": 0});
    let coordinates = normalize_district(&raw).expect("district").coordinates.expect("coords");
    assert_eq!(coordinates.latitude, Some(0.0));
    assert_eq!(coordinates.longitude, Some(0.0));
}

#[test]
fn district_batch_filters_unidentifiable_records() {
    let raws = vec![
        json!({"district_id": "D1", "district_name": "A"}),
        json!({"district_id": "D2"}),
        json!({"district_name": "C"}),
        json!({"districtId": "D4", "districtName": "D"}),
    ];
    let mut log = CoercionLog::new();
    let districts = normalize_districts(&raws, &mut log);
    let ids: Vec<&str> = districts.iter().map(|district| district.district_id.as_str()).collect();
    assert_eq!(ids, vec!["D1", "D4"]);
    assert!(log.is_empty());
}

// ============================================================================
// SECTION: Metrics Tests
// ============================================================================

#[test]
fn employment_rate_is_forty_percent() {
    let raw = json!({"district_id": "123", "total_households": 100, "households_provided_work": 40});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.employment_rate, 40.0);
}

#[test]
fn employment_rate_is_zero_without_households() {
    let raw = json!({"district_id": "123", "total_households": 0, "households_provided_work": 40});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.employment_rate, 0.0);
}

#[test]
fn metrics_without_district_id_is_dropped() {
    assert!(normalize_metrics(&json!({"total_households": 10}), now()).is_none());
    assert!(normalize_metrics(&json!({"district_id": null}), now()).is_none());
}

#[test]
fn metrics_compute_all_rates_and_round() {
    let raw = json!({
        "districtId": "D1",
        "totalWorkdays": "3",
        "workdaysGenerated": "1",
        "totalWages": 200.0,
        "wagesPaid": 150.5
    });
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.work_completion_rate, 33.33);
    assert_eq!(metrics.wage_payment_rate, 75.25);
    assert_eq!(metrics.employment_rate, 0.0);
}

#[test]
fn metrics_default_calendar_fields_from_now() {
    let raw = json!({"district_id": "D1"});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.year, 2025);
    assert_eq!(metrics.month, 3);
    assert_eq!(metrics.financial_year, "2025-26");
    assert_eq!(metrics.data_source, DATA_SOURCE);
    assert_eq!(metrics.last_updated, now());
}

#[test]
fn metrics_keep_supplied_calendar_fields() {
    let raw = json!({"district_id": "D1", "year": "2023", "month": 11, "financial_year": "2023-24"});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.year, 2023);
    assert_eq!(metrics.month, 11);
    assert_eq!(metrics.financial_year, "2023-24");
}

#[test]
fn metrics_year_reads_leading_integer_of_range_label() {
    let raw = json!({"district_id": "D1", "year": "2023-24", "month": "3"});
    let mut log = CoercionLog::new();
    let metrics = normalize_metrics_logged(&raw, now(), &mut log).expect("metrics");
    assert_eq!(metrics.year, 2023);
    assert_eq!(metrics.month, 3);
    assert_eq!(metrics.financial_year, "2023-24");
    assert_eq!(log.len(), 1);
    assert_eq!(log.entries()[0].field, "year");
}

#[test]
fn metrics_counter_reads_leading_integer() {
    let raw = json!({"district_id": "D1", "total_households": "120 (provisional)"});
    let mut log = CoercionLog::new();
    let metrics = normalize_metrics_logged(&raw, now(), &mut log).expect("metrics");
    assert_eq!(metrics.total_households, 120);
    assert_eq!(log.len(), 1);
}

#[test]
fn metrics_overflowing_rate_is_zero_and_serializable() {
    let raw = json!({"district_id": "D1", "total_wages": "0.000001", "wages_paid": "1e305"});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    assert_eq!(metrics.wage_payment_rate, 0.0);
    let value = serde_json::to_value(&metrics).expect("serialize");
    assert_eq!(value["wagePaymentRate"], json!(0.0));
    let decoded: mgnrega_core::MonthlyMetrics = serde_json::from_value(value).expect("decode");
    assert_eq!(decoded, metrics);
}

#[test]
fn metrics_out_of_range_month_falls_back_and_is_logged() {
    let raw = json!({"district_id": "D1", "year": 2022, "month": 13});
    let mut log = CoercionLog::new();
    let metrics = normalize_metrics_logged(&raw, now(), &mut log).expect("metrics");
    assert_eq!(metrics.year, 2022);
    assert_eq!(metrics.month, 3);
    assert_eq!(metrics.financial_year, "2022-23");
    assert_eq!(log.len(), 1);
    assert_eq!(log.entries()[0].field, "month");
}

#[test]
fn metrics_malformed_counters_default_to_zero() {
    let raw = json!({
        "district_id": "D1",
        "total_households": "unknown",
        "total_persons": true,
        "households_demanded_work": "12.9",
        "material_cost": "1,250.50"
    });
    let mut log = CoercionLog::new();
    let metrics = normalize_metrics_logged(&raw, now(), &mut log).expect("metrics");
    assert_eq!(metrics.total_households, 0);
    assert_eq!(metrics.total_persons, 0);
    assert_eq!(metrics.households_demanded_work, 12);
    assert_eq!(metrics.material_cost, 1250.5);
    assert_eq!(log.len(), 2);
}

#[test]
fn metrics_batch_concatenates_and_filters() {
    let raws = vec![
        json!({"district_id": "D1", "month": 1}),
        json!({"state_name": "orphan"}),
        json!({"district_id": "D1", "month": 2}),
    ];
    let mut log = CoercionLog::new();
    let metrics = normalize_metrics_batch(&raws, now(), &mut log);
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].month, 1);
    assert_eq!(metrics[1].month, 2);
}

#[test]
fn metrics_serialize_in_camel_case() {
    let raw = json!({"district_id": "D1", "total_households": 10});
    let metrics = normalize_metrics(&raw, now()).expect("metrics");
    let value = serde_json::to_value(&metrics).expect("serialize");
    assert_eq!(value["districtId"], json!("D1"));
    assert_eq!(value["totalHouseholds"], json!(10));
    assert_eq!(value["lastUpdated"], json!("2025-03-15T10:00:00Z"));
}
