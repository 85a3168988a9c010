//! KPI extraction from one arbitrarily shaped snapshot.
//!
//! A [`SourceProfile`] pairs an alias table with the unit convention of a
//! producer. [`resolve_kpis`] locates the snapshot's record, reads the
//! aliased fields and derives whatever is missing from the percent and unit
//! primitives. Fields that cannot be resolved stay `None`.

use serde_json::Value;

use crate::aliases::{KpiFieldTable, SHIFT_KPI_FIELDS, WORK_ORDER_KPI_FIELDS};
use crate::fallback::first_defined;
use crate::kpi::KpiTuple;
use crate::percent::{compose_oee, compute_quality, normalize_percent, round1};
use crate::snapshot::{lookup_number, resolve_record, Record};
use crate::units::{seconds_per_piece, to_percent_of_nominal, to_uph};

// ---------------------------------------------------------------------------
// Source profiles
// ---------------------------------------------------------------------------

/// How to read KPIs from one kind of producer.
#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    /// Short name used in logs.
    pub name: &'static str,
    pub fields: KpiFieldTable,
    /// Whether the `performance_raw` aliases carry percent of nominal
    /// (otherwise units per hour).
    pub raw_performance_is_percent: bool,
}

/// Live machine row: raw performance is the current speed.
pub const MACHINE_ROW: SourceProfile = SourceProfile {
    name: "machine_row",
    fields: SHIFT_KPI_FIELDS,
    raw_performance_is_percent: false,
};

/// Shift-scoped webhook payload: raw performance is percent of nominal.
pub const SHIFT_SNAPSHOT: SourceProfile = SourceProfile {
    name: "shift_snapshot",
    fields: SHIFT_KPI_FIELDS,
    raw_performance_is_percent: true,
};

/// Aggregated summary, shift fields.
pub const AGGREGATE_SHIFT: SourceProfile = SourceProfile {
    name: "aggregate_shift",
    fields: SHIFT_KPI_FIELDS,
    raw_performance_is_percent: true,
};

/// Work-order fields, read from the work-order record or the aggregate.
pub const WORK_ORDER: SourceProfile = SourceProfile {
    name: "work_order",
    fields: WORK_ORDER_KPI_FIELDS,
    raw_performance_is_percent: true,
};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a KPI tuple from one snapshot.
///
/// Returns an empty tuple when the snapshot holds no record.
pub fn resolve_kpis(snapshot: &Value, profile: &SourceProfile) -> KpiTuple {
    match resolve_record(snapshot) {
        Some(record) => resolve_record_kpis(record, profile),
        None => KpiTuple::default(),
    }
}

/// Resolve a KPI tuple from an already located record.
pub fn resolve_record_kpis(record: &Record, profile: &SourceProfile) -> KpiTuple {
    let fields = &profile.fields;
    let is_percent = profile.raw_performance_is_percent;

    let nominal = positive(lookup_number(record, fields.nominal_uph));
    let raw = positive(lookup_number(record, fields.performance_raw));
    let direct_uph = positive(lookup_number(record, fields.performance_uph)).map(round1);

    let availability = direct_percent(record, fields.availability);

    let performance_percent = first_defined::<f64>(&[
        &|| direct_percent(record, fields.performance_percent),
        &|| raw.filter(|_| is_percent).and_then(normalize_percent),
        &|| {
            let uph = direct_uph.or(raw.filter(|_| !is_percent))?;
            to_percent_of_nominal(uph, nominal)
        },
    ]);

    let performance_uph = first_defined::<f64>(&[
        &|| direct_uph,
        &|| raw.and_then(|r| to_uph(r, nominal, is_percent)),
        &|| performance_percent.and_then(|p| to_uph(p, nominal, true)),
    ]);

    let quality = first_defined::<f64>(&[&|| direct_percent(record, fields.quality), &|| {
        compute_quality(
            lookup_number(record, fields.ok_count),
            lookup_number(record, fields.nok_count),
        )
    }]);

    let oee = first_defined::<f64>(&[&|| direct_percent(record, fields.oee), &|| {
        compose_oee(availability, performance_percent, quality)
    }]);

    let seconds_per_piece = first_defined::<f64>(&[
        &|| positive(lookup_number(record, fields.seconds_per_piece)).map(round1),
        &|| performance_uph.and_then(seconds_per_piece),
    ]);

    KpiTuple {
        oee,
        availability,
        performance_percent,
        performance_uph,
        quality,
        seconds_per_piece,
    }
}

/// A directly reported percent. Zero counts as missing on this path.
fn direct_percent(record: &Record, aliases: &[&str]) -> Option<f64> {
    positive(lookup_number(record, aliases)).and_then(normalize_percent)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
