//! Percent primitives: normalization, quality, availability and OEE.
//!
//! Every function here is total. Unusable input yields `None` ("undefined"),
//! never an error, and every returned percent lies in `[0, 100]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::TimeBudget;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound of every reported percent.
pub const PERCENT_MAX: f64 = 100.0;

/// OEE at or above which a line is considered world class.
pub const WORLD_CLASS_OEE: f64 = 85.0;

/// OEE at or above which a line is considered typical.
pub const TYPICAL_OEE: f64 = 60.0;

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse an arbitrary JSON value into a finite number.
///
/// Accepts JSON numbers and numeric strings. A string with a single decimal
/// comma and no dot (`"85,5"`) is read with the comma as separator.
/// Booleans, empty strings, objects, arrays and non-finite results are
/// undefined.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        return trimmed.replace(',', ".").parse().ok();
    }
    trimmed.parse().ok()
}

// ---------------------------------------------------------------------------
// Percent normalizer
// ---------------------------------------------------------------------------

/// Clamp a number into `[0, 100]`; non-finite input is undefined.
pub fn normalize_percent(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(0.0, PERCENT_MAX))
}

/// Parse and clamp an arbitrary JSON value as a percent.
pub fn normalize_percent_value(value: &Value) -> Option<f64> {
    parse_number(value).and_then(normalize_percent)
}

// ---------------------------------------------------------------------------
// Component calculators
// ---------------------------------------------------------------------------

/// Quality percent from conforming and non-conforming counts.
///
/// Undefined when either count is missing or when no piece was observed
/// (`ok + nok <= 0`), which is distinct from a 0% quality.
pub fn compute_quality(ok: Option<f64>, nok: Option<f64>) -> Option<f64> {
    let (ok, nok) = (ok?, nok?);
    let total = ok + nok;
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    normalize_percent(round1(ok / total * 100.0))
}

/// Availability percent from a time budget.
///
/// When `total_seconds` is not populated the total is taken as productive
/// plus downtime. Undefined when no time was accounted.
pub fn availability_from_time_budget(budget: &TimeBudget) -> Option<f64> {
    let total = if budget.total_seconds > 0.0 {
        budget.total_seconds
    } else {
        budget.productive_seconds + budget.downtime_seconds
    };
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    normalize_percent(round1(budget.productive_seconds / total * 100.0))
}

/// Compose OEE from its three components.
///
/// Every component must be defined. Each one is clamped before the product
/// is taken, so a component of exactly 0 yields a valid OEE of 0.
pub fn compose_oee(
    availability: Option<f64>,
    performance: Option<f64>,
    quality: Option<f64>,
) -> Option<f64> {
    let availability = normalize_percent(availability?)?;
    let performance = normalize_percent(performance?)?;
    let quality = normalize_percent(quality?)?;
    Some(round1(availability * performance * quality / 10_000.0))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coarse OEE classification used for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OeeBand {
    WorldClass,
    Typical,
    Low,
}

impl OeeBand {
    pub fn from_oee(oee: f64) -> Self {
        if oee >= WORLD_CLASS_OEE {
            Self::WorldClass
        } else if oee >= TYPICAL_OEE {
            Self::Typical
        } else {
            Self::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
