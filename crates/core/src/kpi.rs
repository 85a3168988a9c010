//! The canonical KPI tuple and authority-ordered merging.

use serde::{Deserialize, Serialize};

/// Canonical KPI record for one source or one scope.
///
/// Every field is independently optional: `None` means "not computable
/// from this source", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiTuple {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_per_piece: Option<f64>,
}

impl KpiTuple {
    /// Whether any field is defined.
    ///
    /// Callers use this to decide whether another snapshot must be fetched
    /// before giving up on a scope.
    pub fn has_any_value(&self) -> bool {
        self.oee.is_some()
            || self.availability.is_some()
            || self.performance_percent.is_some()
            || self.performance_uph.is_some()
            || self.quality.is_some()
            || self.seconds_per_piece.is_some()
    }

    /// Whether every field is defined.
    pub fn is_complete(&self) -> bool {
        self.oee.is_some()
            && self.availability.is_some()
            && self.performance_percent.is_some()
            && self.performance_uph.is_some()
            && self.quality.is_some()
            && self.seconds_per_piece.is_some()
    }

    /// Fill the fields still undefined in `self` from `lower`.
    ///
    /// Defined fields are never overwritten.
    pub fn fill_from(&mut self, lower: &KpiTuple) {
        self.oee = self.oee.or(lower.oee);
        self.availability = self.availability.or(lower.availability);
        self.performance_percent = self.performance_percent.or(lower.performance_percent);
        self.performance_uph = self.performance_uph.or(lower.performance_uph);
        self.quality = self.quality.or(lower.quality);
        self.seconds_per_piece = self.seconds_per_piece.or(lower.seconds_per_piece);
    }
}

/// Merge tuples ordered most-authoritative first.
///
/// Each field takes the value of the first tuple defining it.
pub fn merge_kpis<'a, I>(tuples: I) -> KpiTuple
where
    I: IntoIterator<Item = &'a KpiTuple>,
{
    let mut merged = KpiTuple::default();
    for tuple in tuples {
        if merged.is_complete() {
            break;
        }
        merged.fill_from(tuple);
    }
    merged
}
