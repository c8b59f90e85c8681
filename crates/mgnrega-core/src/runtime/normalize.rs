// crates/mgnrega-core/src/runtime/normalize.rs
// ============================================================================
// Module: Record Normalizer
// Description: Coerces raw open-data records into canonical documents.
// Purpose: Best-effort ingestion that never fails on malformed input.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Raw records arrive with snake_case or camelCase keys and with numbers
//! encoded as JSON numbers or strings. The normalizer looks up each field
//! under both spellings, parses it leniently, and falls back to a default
//! when the value is missing or malformed:
//!
//! - counters and amounts default to `0` (negative values also become `0`),
//! - geographic and physical fields default to `None`,
//! - `year`/`month` default to the calendar year/month of the supplied `now`.
//!
//! Records without a district identifier (and, for districts, a name) are
//! dropped. Every substitution of a *present but unusable* value is recorded
//! in a [`CoercionLog`] so hosts can surface it under a warning policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::Coordinates;
use crate::core::DATA_SOURCE;
use crate::core::District;
use crate::core::MonthlyMetrics;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum characters of a raw value kept in a coercion entry.
const MAX_LOGGED_VALUE_CHARS: usize = 64;

/// Largest year accepted from raw input.
const MAX_YEAR: f64 = 9999.0;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Snake_case and camelCase spellings of one raw field.
type FieldName = (&'static str, &'static str);

/// District identifier.
const DISTRICT_ID: FieldName = ("district_id", "districtId");
/// District name.
const DISTRICT_NAME: FieldName = ("district_name", "districtName");
/// State name.
const STATE_NAME: FieldName = ("state_name", "stateName");
/// State code.
const STATE_CODE: FieldName = ("state_code", "stateCode");
/// Latitude.
const LATITUDE: FieldName = ("latitude", "latitude");
/// Longitude.
const LONGITUDE: FieldName = ("longitude", "longitude");
/// Population.
const POPULATION: FieldName = ("population", "population");
/// Area.
const AREA: FieldName = ("area", "area");
/// Calendar year.
const YEAR: FieldName = ("year", "year");
/// Calendar month.
const MONTH: FieldName = ("month", "month");
/// Financial year label.
const FINANCIAL_YEAR: FieldName = ("financial_year", "financialYear");
/// Registered households.
const TOTAL_HOUSEHOLDS: FieldName = ("total_households", "totalHouseholds");
/// Households that demanded work.
const HOUSEHOLDS_DEMANDED_WORK: FieldName = ("households_demanded_work", "householdsDemandedWork");
/// Households provided work.
const HOUSEHOLDS_PROVIDED_WORK: FieldName = ("households_provided_work", "householdsProvidedWork");
/// Registered persons.
const TOTAL_PERSONS: FieldName = ("total_persons", "totalPersons");
/// Persons that demanded work.
const PERSONS_DEMANDED_WORK: FieldName = ("persons_demanded_work", "personsDemandedWork");
/// Persons provided work.
const PERSONS_PROVIDED_WORK: FieldName = ("persons_provided_work", "personsProvidedWork");
/// Sanctioned workdays.
const TOTAL_WORKDAYS: FieldName = ("total_workdays", "totalWorkdays");
/// Workdays generated.
const WORKDAYS_GENERATED: FieldName = ("workdays_generated", "workdaysGenerated");
/// Wages due.
const TOTAL_WAGES: FieldName = ("total_wages", "totalWages");
/// Wages paid.
const WAGES_PAID: FieldName = ("wages_paid", "wagesPaid");
/// Material cost.
const MATERIAL_COST: FieldName = ("material_cost", "materialCost");
/// Administrative cost.
const ADMINISTRATIVE_COST: FieldName = ("administrative_cost", "administrativeCost");

// ============================================================================
// SECTION: Coercion Policy
// ============================================================================

/// How hosts treat values the normalizer had to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// Coerce without reporting.
    #[default]
    Silent,
    /// Coerce and emit a warning per coerced field.
    Warn,
}

/// One coerced field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    /// District identifier of the record, when known.
    pub record_id: Option<String>,
    /// Snake_case field name.
    pub field: &'static str,
    /// Raw value as JSON text, truncated.
    pub raw: String,
}

/// Collected coercions for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionLog {
    /// Entries in encounter order.
    entries: Vec<Coercion>,
}

impl CoercionLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the recorded coercions.
    #[must_use]
    pub fn entries(&self) -> &[Coercion] {
        &self.entries
    }

    /// Returns the number of coerced fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was coerced.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a coercion of `raw` in `field`.
    fn record(&mut self, record_id: Option<&str>, field: &'static str, raw: &Value) {
        let raw: String = raw.to_string().chars().take(MAX_LOGGED_VALUE_CHARS).collect();
        self.entries.push(Coercion {
            record_id: record_id.map(str::to_string),
            field,
            raw,
        });
    }
}

// ============================================================================
// SECTION: District Normalization
// ============================================================================

/// Normalizes one raw district record.
///
/// Returns `None` when the identifier or name is missing.
#[must_use]
pub fn normalize_district(raw: &Value) -> Option<District> {
    normalize_district_logged(raw, &mut CoercionLog::new())
}

/// Normalizes one raw district record, recording coercions in `log`.
pub fn normalize_district_logged(raw: &Value, log: &mut CoercionLog) -> Option<District> {
    let district_id = text_field(raw, DISTRICT_ID)?;
    let district_name = text_field(raw, DISTRICT_NAME)?;
    let mut reader = FieldReader {
        raw,
        record_id: &district_id,
        log,
    };
    let latitude = reader.optional_float(LATITUDE);
    let longitude = reader.optional_float(LONGITUDE);
    let coordinates = (latitude.is_some() || longitude.is_some()).then_some(Coordinates {
        latitude,
        longitude,
    });
    let population = reader.optional_integer(POPULATION);
    let area = reader.optional_float(AREA);
    Some(District {
        state_name: text_field(raw, STATE_NAME),
        state_code: text_field(raw, STATE_CODE),
        coordinates,
        population,
        area,
        district_name,
        district_id,
    })
}

/// Normalizes a batch of raw district records, dropping unusable ones.
pub fn normalize_districts(raws: &[Value], log: &mut CoercionLog) -> Vec<District> {
    raws.iter().filter_map(|raw| normalize_district_logged(raw, log)).collect()
}

// ============================================================================
// SECTION: Metrics Normalization
// ============================================================================

/// Normalizes one raw metrics record stamped with `now`.
///
/// Returns `None` when the district identifier is missing.
#[must_use]
pub fn normalize_metrics(raw: &Value, now: Timestamp) -> Option<MonthlyMetrics> {
    normalize_metrics_logged(raw, now, &mut CoercionLog::new())
}

/// Normalizes one raw metrics record, recording coercions in `log`.
pub fn normalize_metrics_logged(
    raw: &Value,
    now: Timestamp,
    log: &mut CoercionLog,
) -> Option<MonthlyMetrics> {
    let district_id = text_field(raw, DISTRICT_ID)?;
    let mut reader = FieldReader {
        raw,
        record_id: &district_id,
        log,
    };

    let year = reader
        .calendar(YEAR, 1.0, MAX_YEAR)
        .and_then(|value| i32::try_from(value).ok())
        .unwrap_or_else(|| now.year());
    let month = reader
        .calendar(MONTH, 1.0, 12.0)
        .and_then(|value| u8::try_from(value).ok())
        .unwrap_or_else(|| now.month());
    let financial_year =
        text_field(raw, FINANCIAL_YEAR).unwrap_or_else(|| default_financial_year(year));

    let total_households = reader.counter(TOTAL_HOUSEHOLDS);
    let households_demanded_work = reader.counter(HOUSEHOLDS_DEMANDED_WORK);
    let households_provided_work = reader.counter(HOUSEHOLDS_PROVIDED_WORK);
    let total_persons = reader.counter(TOTAL_PERSONS);
    let persons_demanded_work = reader.counter(PERSONS_DEMANDED_WORK);
    let persons_provided_work = reader.counter(PERSONS_PROVIDED_WORK);
    let total_workdays = reader.counter(TOTAL_WORKDAYS);
    let workdays_generated = reader.counter(WORKDAYS_GENERATED);
    let total_wages = reader.amount(TOTAL_WAGES);
    let wages_paid = reader.amount(WAGES_PAID);
    let material_cost = reader.amount(MATERIAL_COST);
    let administrative_cost = reader.amount(ADMINISTRATIVE_COST);

    Some(MonthlyMetrics {
        district_name: text_field(raw, DISTRICT_NAME),
        state_name: text_field(raw, STATE_NAME),
        year,
        month,
        financial_year,
        total_households,
        households_demanded_work,
        households_provided_work,
        total_persons,
        persons_demanded_work,
        persons_provided_work,
        total_workdays,
        workdays_generated,
        total_wages,
        wages_paid,
        material_cost,
        administrative_cost,
        employment_rate: percentage(
            counter_as_f64(households_provided_work),
            counter_as_f64(total_households),
        ),
        work_completion_rate: percentage(
            counter_as_f64(workdays_generated),
            counter_as_f64(total_workdays),
        ),
        wage_payment_rate: percentage(wages_paid, total_wages),
        data_source: DATA_SOURCE.to_string(),
        last_updated: now,
        district_id,
    })
}

/// Normalizes a batch of raw metrics records, dropping unusable ones.
pub fn normalize_metrics_batch(
    raws: &[Value],
    now: Timestamp,
    log: &mut CoercionLog,
) -> Vec<MonthlyMetrics> {
    raws.iter().filter_map(|raw| normalize_metrics_logged(raw, now, log)).collect()
}

// ============================================================================
// SECTION: Derived Values
// ============================================================================

/// Returns `numerator / denominator * 100` rounded to two decimals, or `0`
/// when the denominator is not positive or the ratio overflows.
#[must_use]
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator * 100.0;
    if !ratio.is_finite() {
        return 0.0;
    }
    let rounded = round_two_decimals(ratio);
    if rounded.is_finite() { rounded } else { ratio }
}

/// Returns the financial year label starting in `year`, e.g. `2024-25`.
#[must_use]
pub fn default_financial_year(year: i32) -> String {
    let next = year.saturating_add(1).rem_euclid(100);
    format!("{year}-{next:02}")
}

/// Rounds to two decimal places.
fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Widens a counter for rate arithmetic.
#[allow(clippy::cast_precision_loss, reason = "Counters far below 2^53 in practice.")]
const fn counter_as_f64(value: u64) -> f64 {
    value as f64
}

// ============================================================================
// SECTION: Field Parsing
// ============================================================================

/// Result of reading a numeric field.
enum Numeric<'a> {
    /// Field missing, null, or an empty string.
    Absent,
    /// Field parsed to a finite number.
    Parsed(f64),
    /// Field present but unusable; carries the raw value.
    Malformed(&'a Value),
}

/// Reads numeric fields from one raw record and logs coercions.
struct FieldReader<'a, 'log> {
    /// Raw record.
    raw: &'a Value,
    /// District identifier used in coercion entries.
    record_id: &'a str,
    /// Coercion sink.
    log: &'log mut CoercionLog,
}

impl FieldReader<'_, '_> {
    /// Reads a non-negative integer counter, defaulting to `0`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Value is finite and non-negative; fractional parts truncate and `as` saturates."
    )]
    fn counter(&mut self, name: FieldName) -> u64 {
        match numeric_field(self.raw, name) {
            Numeric::Absent => 0,
            Numeric::Parsed(value) if value >= 0.0 => value.trunc() as u64,
            Numeric::Parsed(_) => {
                self.coerced(name);
                0
            }
            Numeric::Malformed(raw) => {
                self.log.record(Some(self.record_id), name.0, raw);
                match leading_integer(raw) {
                    Some(value) if value >= 0.0 => value as u64,
                    _ => 0,
                }
            }
        }
    }

    /// Reads a non-negative amount, defaulting to `0.0`.
    fn amount(&mut self, name: FieldName) -> f64 {
        match numeric_field(self.raw, name) {
            Numeric::Absent => 0.0,
            Numeric::Parsed(value) if value >= 0.0 => value,
            Numeric::Parsed(_) => {
                self.coerced(name);
                0.0
            }
            Numeric::Malformed(raw) => {
                self.log.record(Some(self.record_id), name.0, raw);
                0.0
            }
        }
    }

    /// Reads an optional float, `None` when missing or malformed.
    fn optional_float(&mut self, name: FieldName) -> Option<f64> {
        match numeric_field(self.raw, name) {
            Numeric::Absent => None,
            Numeric::Parsed(value) => Some(value),
            Numeric::Malformed(raw) => {
                self.log.record(Some(self.record_id), name.0, raw);
                None
            }
        }
    }

    /// Reads an optional integer, `None` when missing or malformed.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Value is finite; fractional parts truncate and `as` saturates."
    )]
    fn optional_integer(&mut self, name: FieldName) -> Option<i64> {
        self.optional_float(name).map(|value| value.trunc() as i64)
    }

    /// Reads an integer in `min..=max`, `None` when missing or out of range.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Value is range-checked against small bounds before the cast."
    )]
    fn calendar(&mut self, name: FieldName, min: f64, max: f64) -> Option<i64> {
        match numeric_field(self.raw, name) {
            Numeric::Absent => None,
            Numeric::Parsed(value) => {
                let whole = value.trunc();
                if (min..=max).contains(&whole) {
                    Some(whole as i64)
                } else {
                    self.coerced(name);
                    None
                }
            }
            Numeric::Malformed(raw) => {
                self.log.record(Some(self.record_id), name.0, raw);
                leading_integer(raw)
                    .filter(|whole| (min..=max).contains(whole))
                    .map(|whole| whole as i64)
            }
        }
    }

    /// Logs a coercion of a parsed-but-rejected value.
    fn coerced(&mut self, name: FieldName) {
        if let Some(raw) = lookup(self.raw, name) {
            self.log.record(Some(self.record_id), name.0, raw);
        }
    }
}

/// Returns the first present, non-null, non-empty value under either spelling.
fn lookup(raw: &Value, (snake, camel): FieldName) -> Option<&Value> {
    [snake, camel].into_iter().filter_map(|key| raw.get(key)).find(|value| match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    })
}

/// Reads a text field; numbers are rendered to text.
fn text_field(raw: &Value, name: FieldName) -> Option<String> {
    match lookup(raw, name)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reads a numeric field encoded as a JSON number or a numeric string.
fn numeric_field(raw: &Value, name: FieldName) -> Numeric<'_> {
    let Some(value) = lookup(raw, name) else {
        return Numeric::Absent;
    };
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_numeric_text(text),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() => Numeric::Parsed(number),
        _ => Numeric::Malformed(value),
    }
}

/// Parses numeric text, accepting thousands separators.
fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    trimmed.parse::<f64>().ok().or_else(|| trimmed.replace(',', "").parse::<f64>().ok())
}

/// Parses the leading signed integer of a string, e.g. `2023` from `2023-24`.
fn leading_integer(value: &Value) -> Option<f64> {
    let Value::String(text) = value else {
        return None;
    };
    let trimmed = text.trim();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[sign_len..].chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..sign_len + digits_len].parse::<f64>().ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::parse_rfc3339("2025-03-15T10:00:00Z").unwrap()
    }

    #[test]
    fn lookup_skips_empty_snake_case_value() {
        let raw = json!({"district_id": "", "districtId": "D1"});
        assert_eq!(text_field(&raw, DISTRICT_ID).as_deref(), Some("D1"));
    }

    #[test]
    fn numeric_text_accepts_thousands_separators() {
        assert_eq!(parse_numeric_text(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_numeric_text("n/a"), None);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert!((percentage(1.0, 3.0) - 33.33).abs() < f64::EPSILON);
        assert!((percentage(2.0, 3.0) - 66.67).abs() < f64::EPSILON);
        assert!(percentage(5.0, 0.0).abs() < f64::EPSILON);
        assert!(percentage(5.0, -1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_stays_finite_on_overflowing_ratio() {
        assert!(percentage(1.0e305, 0.000_001).abs() < f64::EPSILON);
        assert!(percentage(f64::MAX, 1.0).abs() < f64::EPSILON);
        let huge = percentage(1.0e300, 1.0);
        assert!(huge.is_finite());
        assert!(huge > 0.0);
    }

    #[test]
    fn leading_integer_reads_prefix_only() {
        assert_eq!(leading_integer(&json!("2023-24")), Some(2023.0));
        assert_eq!(leading_integer(&json!(" 12 households")), Some(12.0));
        assert_eq!(leading_integer(&json!("-7x")), Some(-7.0));
        assert_eq!(leading_integer(&json!("n/a")), None);
        assert_eq!(leading_integer(&json!("-")), None);
        assert_eq!(leading_integer(&json!(5)), None);
    }

    #[test]
    fn financial_year_wraps_century() {
        assert_eq!(default_financial_year(2024), "2024-25");
        assert_eq!(default_financial_year(2099), "2099-00");
        assert_eq!(default_financial_year(2008), "2008-09");
    }

    #[test]
    fn negative_counter_is_logged_and_zeroed() {
        let mut log = CoercionLog::new();
        let raw = json!({"district_id": "D1", "total_households": -5});
        let metrics = normalize_metrics_logged(&raw, now(), &mut log).unwrap();
        assert_eq!(metrics.total_households, 0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].field, "total_households");
        assert_eq!(log.entries()[0].record_id.as_deref(), Some("D1"));
    }
}
