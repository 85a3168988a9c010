//! Performance unit conversion between percent-of-nominal and units/hour.

use crate::percent::{normalize_percent, round1};

/// Seconds per hour (3600.0).
pub const SECS_PER_HOUR: f64 = 3600.0;

/// Share of nominal speed used as the default production target.
pub const TARGET_SPEED_RATIO: f64 = 0.85;

/// Convert a raw performance value to units per hour.
///
/// When `raw_is_percent` is false the value already is a speed and is only
/// rounded. Otherwise it is read as percent of `nominal_uph`, which must be
/// known and positive.
pub fn to_uph(raw: f64, nominal_uph: Option<f64>, raw_is_percent: bool) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    if !raw_is_percent {
        return Some(round1(raw));
    }
    let nominal = nominal_uph.filter(|n| n.is_finite() && *n > 0.0)?;
    Some(round1(raw / 100.0 * nominal))
}

/// Convert a speed to a clamped percent of `nominal_uph`.
pub fn to_percent_of_nominal(uph: f64, nominal_uph: Option<f64>) -> Option<f64> {
    let nominal = nominal_uph.filter(|n| n.is_finite() && *n > 0.0)?;
    normalize_percent(round1(uph / nominal * 100.0))
}

/// The 85%-of-nominal target speed.
pub fn target_uph(nominal_uph: Option<f64>) -> Option<f64> {
    nominal_uph
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| round1(n * TARGET_SPEED_RATIO))
}

/// Cycle time in seconds per piece for a positive speed.
pub fn seconds_per_piece(uph: f64) -> Option<f64> {
    if !uph.is_finite() || uph <= 0.0 {
        return None;
    }
    Some(round1(SECS_PER_HOUR / uph))
}
