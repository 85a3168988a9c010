//! Shared value types passed between the engine components.

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Piece counts for one scope (a shift or a work order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionCounts {
    #[serde(default)]
    pub ok: u64,
    #[serde(default)]
    pub nok: u64,
    #[serde(default)]
    pub rework: u64,
    #[serde(default)]
    pub total: u64,
}

impl ProductionCounts {
    /// Total pieces produced so far.
    ///
    /// Uses the explicit `total` when it is populated, otherwise the sum of
    /// the three categories.
    pub fn produced(&self) -> u64 {
        if self.total > 0 {
            self.total
        } else {
            self.ok.saturating_add(self.nok).saturating_add(self.rework)
        }
    }
}

/// Time accounting for one scope, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeBudget {
    #[serde(default)]
    pub productive_seconds: f64,
    #[serde(default)]
    pub downtime_seconds: f64,
    #[serde(default)]
    pub total_seconds: f64,
}

/// Which scope a set of KPIs or counts belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Shift,
    WorkOrder,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::WorkOrder => "work_order",
        }
    }
}
