//! The dashboard context document: every input of one card computation.
//!
//! External collaborators (query handlers, sync caches) assemble this
//! document; the builder consumes it without further I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::snapshot::{resolve_record, Record};
use crate::types::{ProductionCounts, TimeBudget, Timestamp};

/// Which snapshot of the context a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSlot {
    /// Raw live machine row.
    Machine,
    /// Freshly fetched shift-scoped snapshot.
    Shift,
    /// Generic aggregated summary.
    Aggregate,
    /// Work-order record.
    WorkOrder,
}

/// Inputs for one machine/shift/work-order card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardContext {
    #[serde(default)]
    pub machine: Option<Value>,
    #[serde(default)]
    pub shift: Option<Value>,
    #[serde(default)]
    pub aggregate: Option<Value>,
    #[serde(default)]
    pub work_order: Option<Value>,
    #[serde(default)]
    pub shift_counts: Option<ProductionCounts>,
    #[serde(default)]
    pub work_order_counts: Option<ProductionCounts>,
    #[serde(default)]
    pub shift_time: Option<TimeBudget>,
    /// Instant the card is computed for. Callers may override it.
    #[serde(default)]
    pub now: Option<Timestamp>,
}

impl DashboardContext {
    /// Parse and validate a context document.
    pub fn from_json(document: Value) -> Result<Self, CoreError> {
        let context: Self = serde_json::from_value(document)
            .map_err(|e| CoreError::Validation(format!("Malformed dashboard context: {e}")))?;
        context.validate()?;
        Ok(context)
    }

    /// Reject snapshots that can never hold a record.
    ///
    /// `null` snapshots are accepted as absent; scalars are not. Time
    /// budgets must be finite and non-negative.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, snapshot) in [
            ("machine", &self.machine),
            ("shift", &self.shift),
            ("aggregate", &self.aggregate),
            ("work_order", &self.work_order),
        ] {
            if let Some(value) = snapshot {
                if !(value.is_null() || value.is_object() || value.is_array()) {
                    return Err(CoreError::InvalidDocument {
                        field,
                        reason: "snapshot must be an object or an array".to_string(),
                    });
                }
            }
        }
        if let Some(budget) = &self.shift_time {
            let parts = [
                budget.productive_seconds,
                budget.downtime_seconds,
                budget.total_seconds,
            ];
            if parts.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(CoreError::InvalidDocument {
                    field: "shift_time",
                    reason: "seconds must be finite and non-negative".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn snapshot(&self, slot: SnapshotSlot) -> Option<&Value> {
        match slot {
            SnapshotSlot::Machine => self.machine.as_ref(),
            SnapshotSlot::Shift => self.shift.as_ref(),
            SnapshotSlot::Aggregate => self.aggregate.as_ref(),
            SnapshotSlot::WorkOrder => self.work_order.as_ref(),
        }
    }
}

/// The located record of every snapshot in a context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedRecords<'a> {
    pub machine: Option<&'a Record>,
    pub shift: Option<&'a Record>,
    pub aggregate: Option<&'a Record>,
    pub work_order: Option<&'a Record>,
}

impl<'a> ResolvedRecords<'a> {
    pub fn from_context(context: &'a DashboardContext) -> Self {
        let locate = |slot| context.snapshot(slot).and_then(resolve_record);
        Self {
            machine: locate(SnapshotSlot::Machine),
            shift: locate(SnapshotSlot::Shift),
            aggregate: locate(SnapshotSlot::Aggregate),
            work_order: locate(SnapshotSlot::WorkOrder),
        }
    }

    pub fn get(&self, slot: SnapshotSlot) -> Option<&'a Record> {
        match slot {
            SnapshotSlot::Machine => self.machine,
            SnapshotSlot::Shift => self.shift,
            SnapshotSlot::Aggregate => self.aggregate,
            SnapshotSlot::WorkOrder => self.work_order,
        }
    }

    /// Records for `slots`, in order, skipping absent ones.
    pub fn in_order(&self, slots: &[SnapshotSlot]) -> Vec<&'a Record> {
        slots.iter().filter_map(|slot| self.get(*slot)).collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_document() {
        let context = DashboardContext::from_json(json!({
            "machine": {"stato": "RUN"},
            "shift": [{"oee": 70}],
            "work_order_counts": {"ok": 10, "nok": 1},
            "shift_time": {"productive_seconds": 100.0, "downtime_seconds": 20.0},
            "now": "2024-03-01T08:00:00Z"
        }))
        .unwrap();
        assert!(context.machine.is_some());
        assert_eq!(context.work_order_counts.unwrap().ok, 10);
        assert!(context.now.is_some());
    }

    #[test]
    fn empty_document_is_valid() {
        let context = DashboardContext::from_json(json!({})).unwrap();
        assert_eq!(context, DashboardContext::default());
    }

    #[test]
    fn scalar_snapshot_is_rejected() {
        let result = DashboardContext::from_json(json!({"machine": "RUN"}));
        assert_matches!(
            result,
            Err(CoreError::InvalidDocument { field: "machine", .. })
        );
    }

    #[test]
    fn negative_counts_are_malformed() {
        let result = DashboardContext::from_json(json!({"shift_counts": {"ok": -1}}));
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn negative_time_budget_is_rejected() {
        let result = DashboardContext::from_json(json!({
            "shift_time": {"productive_seconds": -5.0}
        }));
        assert_matches!(
            result,
            Err(CoreError::InvalidDocument { field: "shift_time", .. })
        );
    }

    #[test]
    fn null_snapshot_counts_as_absent() {
        let context = DashboardContext::from_json(json!({"aggregate": null})).unwrap();
        let records = ResolvedRecords::from_context(&context);
        assert!(records.aggregate.is_none());
    }

    #[test]
    fn records_are_located_per_slot() {
        let context = DashboardContext {
            shift: Some(json!({"data": {"oee": 61}})),
            work_order: Some(json!([{"commessa": "WO-1"}])),
            ..Default::default()
        };
        let records = ResolvedRecords::from_context(&context);
        assert_eq!(records.shift.unwrap().get("oee"), Some(&json!(61)));
        assert_eq!(
            records.get(SnapshotSlot::WorkOrder).unwrap().get("commessa"),
            Some(&json!("WO-1"))
        );
        assert_eq!(
            records
                .in_order(&[SnapshotSlot::Machine, SnapshotSlot::Shift])
                .len(),
            1
        );
    }
}
