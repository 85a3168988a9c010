//! Dashboard card assembly for one machine/shift/work-order context.
//!
//! This is the only orchestration layer of the engine: it resolves each
//! snapshot, merges KPI tuples by authority, picks production counts and
//! runs the remaining-time estimator. The result depends only on the
//! context and the injected `now`.

use serde::{Deserialize, Serialize};

use crate::aliases::{
    ACTUAL_END, ACTUAL_START, ESTIMATED_END, MACHINE_CODE, MACHINE_NAME,
    NOMINAL_UPH, OPERATOR_NAME, PLANNED_END, PLANNED_QUANTITY, PRODUCT_CODE,
    PRODUCT_DESCRIPTION, SHIFT_CODE, SHIFT_KPI_FIELDS, SHIFT_REWORK, STATUS_CODE, STATUS_LABEL,
    TARGET85_UPH, WORK_ORDER_CODE, WORK_ORDER_NOK, WORK_ORDER_OK, WORK_ORDER_REWORK,
};
use crate::context::{DashboardContext, ResolvedRecords, SnapshotSlot};
use crate::fallback::{first_defined, pick_nonzero_count};
use crate::kpi::{merge_kpis, KpiTuple};
use crate::percent::{
    availability_from_time_budget, compose_oee, compute_quality, normalize_percent, round1,
    OeeBand,
};
use crate::resolver::{
    resolve_record_kpis, SourceProfile, AGGREGATE_SHIFT, MACHINE_ROW, SHIFT_SNAPSHOT, WORK_ORDER,
};
use crate::remaining_time::{
    elapsed_hours, estimate_remaining, format_hours, RemainingTimeInput, RemainingTimeSource,
};
use crate::snapshot::{lookup_number, lookup_text};
use crate::types::{ProductionCounts, Scope, Timestamp};
use crate::units::{seconds_per_piece, target_uph};

use SnapshotSlot::{Aggregate, Machine, Shift, WorkOrder};

// ---------------------------------------------------------------------------
// Fallback orders
// ---------------------------------------------------------------------------

/// Shift KPI sources, most authoritative first.
const SHIFT_KPI_SOURCES: &[(SnapshotSlot, SourceProfile)] = &[
    (Shift, SHIFT_SNAPSHOT),
    (Aggregate, AGGREGATE_SHIFT),
    (Machine, MACHINE_ROW),
];

/// Work-order KPI sources, most authoritative first.
const WORK_ORDER_KPI_SOURCES: &[(SnapshotSlot, SourceProfile)] =
    &[(WorkOrder, WORK_ORDER), (Aggregate, WORK_ORDER)];

/// Identity fields: aliases and the snapshot order they are searched in.
const IDENTITY_CHAINS: &[(IdentityField, &[&str], &[SnapshotSlot])] = &[
    (IdentityField::MachineCode, MACHINE_CODE, &[Machine, Shift, Aggregate, WorkOrder]),
    (IdentityField::MachineName, MACHINE_NAME, &[Machine, Aggregate, Shift]),
    (IdentityField::StatusCode, STATUS_CODE, &[Machine, Shift, Aggregate]),
    (IdentityField::StatusLabel, STATUS_LABEL, &[Machine, Shift, Aggregate]),
    (IdentityField::OperatorName, OPERATOR_NAME, &[Shift, Machine, Aggregate]),
    (IdentityField::ShiftCode, SHIFT_CODE, &[Shift, Aggregate, Machine]),
    (IdentityField::WorkOrderCode, WORK_ORDER_CODE, &[WorkOrder, Machine, Shift, Aggregate]),
    (IdentityField::ProductCode, PRODUCT_CODE, &[WorkOrder, Machine, Aggregate]),
    (IdentityField::ProductDescription, PRODUCT_DESCRIPTION, &[WorkOrder, Machine, Aggregate]),
];

const SHIFT_COUNT_SOURCES: &[SnapshotSlot] = &[Shift, Aggregate, Machine];
const WORK_ORDER_COUNT_SOURCES: &[SnapshotSlot] = &[WorkOrder, Aggregate, Machine];
const SPEED_SOURCES: &[SnapshotSlot] = &[WorkOrder, Machine, Shift, Aggregate];
const SCHEDULE_SOURCES: &[SnapshotSlot] = &[WorkOrder, Aggregate, Machine];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentityField {
    MachineCode,
    MachineName,
    StatusCode,
    StatusLabel,
    OperatorName,
    ShiftCode,
    WorkOrderCode,
    ProductCode,
    ProductDescription,
}

/// Who and what the card describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

impl CardIdentity {
    fn slot_mut(&mut self, field: IdentityField) -> &mut Option<String> {
        match field {
            IdentityField::MachineCode => &mut self.machine_code,
            IdentityField::MachineName => &mut self.machine_name,
            IdentityField::StatusCode => &mut self.status_code,
            IdentityField::StatusLabel => &mut self.status_label,
            IdentityField::OperatorName => &mut self.operator_name,
            IdentityField::ShiftCode => &mut self.shift_code,
            IdentityField::WorkOrderCode => &mut self.work_order_code,
            IdentityField::ProductCode => &mut self.product_code,
            IdentityField::ProductDescription => &mut self.product_description,
        }
    }
}

/// KPIs and counts of one scope.
///
/// `scrap_percent` is always serialized: `null` means no piece was produced
/// yet, so scrap does not apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSection {
    pub scope: Scope,
    pub kpis: KpiTuple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oee_band: Option<OeeBand>,
    pub counts: ProductionCounts,
    pub scrap_percent: Option<f64>,
}

/// Work-order progress against plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSection {
    pub planned_quantity: u64,
    pub produced_ok: u64,
    /// `0` without a positive plan.
    pub progress_percent: f64,
}

/// Speeds, in units per hour unless noted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocitySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target85_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_speed_uph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_per_piece: Option<f64>,
}

/// Remaining time to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingSection {
    /// Absent when unknown; `0` when due or complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub source: RemainingTimeSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_hours: Option<f64>,
    pub schedule_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_hours: Option<f64>,
}

/// The consolidated, read-only dashboard record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCard {
    pub computed_at: Timestamp,
    pub identity: CardIdentity,
    pub shift: ScopeSection,
    pub work_order: ScopeSection,
    pub progress: ProgressSection,
    pub velocity: VelocitySection,
    pub remaining: RemainingSection,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the dashboard card for `context` as of `now`.
pub fn build_dashboard_card(context: &DashboardContext, now: Timestamp) -> DashboardCard {
    let records = ResolvedRecords::from_context(context);

    let identity = resolve_identity(&records);

    let shift_counts = resolve_shift_counts(context, &records);
    let work_order_counts = resolve_work_order_counts(context, &records);

    let shift_kpis = with_derived_components(
        merge_scope_kpis(&records, SHIFT_KPI_SOURCES, Scope::Shift),
        context.shift_time.as_ref().and_then(availability_from_time_budget),
        &shift_counts,
    );
    let work_order_kpis = with_derived_components(
        merge_scope_kpis(&records, WORK_ORDER_KPI_SOURCES, Scope::WorkOrder),
        None,
        &work_order_counts,
    );

    let planned_candidates = candidates_from(&records, WORK_ORDER_COUNT_SOURCES, PLANNED_QUANTITY);
    let planned = pick_nonzero_count(&planned_candidates).unwrap_or(0.0);
    let produced_ok = work_order_counts.ok as f64;

    let nominal_uph = first_positive(&records, SPEED_SOURCES, NOMINAL_UPH);
    let target85_uph = first_positive(&records, SPEED_SOURCES, TARGET85_UPH)
        .or_else(|| target_uph(nominal_uph));

    let remaining_input = RemainingTimeInput {
        planned,
        produced_ok,
        work_order_uph: work_order_kpis.performance_uph,
        shift_uph: shift_kpis.performance_uph,
        nominal_uph,
        target85_uph,
        planned_end_date: first_text(&records, SCHEDULE_SOURCES, PLANNED_END),
        actual_start_date: first_text(&records, SCHEDULE_SOURCES, ACTUAL_START),
        actual_end_date: first_text(&records, SCHEDULE_SOURCES, ACTUAL_END),
        estimated_end_date: first_text(&records, SCHEDULE_SOURCES, ESTIMATED_END),
        now,
    };
    let estimate = estimate_remaining(&remaining_input);

    tracing::debug!(
        work_order = identity.work_order_code.as_deref().unwrap_or("-"),
        shift_oee = ?shift_kpis.oee,
        work_order_oee = ?work_order_kpis.oee,
        remaining_hours = ?estimate.hours,
        remaining_source = ?estimate.source,
        "Dashboard card built",
    );

    let velocity = VelocitySection {
        nominal_uph,
        target85_uph,
        shift_uph: shift_kpis.performance_uph,
        work_order_uph: work_order_kpis.performance_uph,
        base_speed_uph: estimate.base_speed_uph.map(round1),
        seconds_per_piece: first_defined::<f64>(&[
            &|| work_order_kpis.seconds_per_piece,
            &|| shift_kpis.seconds_per_piece,
            &|| estimate.base_speed_uph.and_then(seconds_per_piece),
        ]),
    };

    DashboardCard {
        computed_at: now,
        identity,
        shift: scope_section(Scope::Shift, shift_kpis, shift_counts),
        work_order: scope_section(Scope::WorkOrder, work_order_kpis, work_order_counts),
        progress: ProgressSection {
            planned_quantity: planned.round() as u64,
            produced_ok: work_order_counts.ok,
            progress_percent: progress_percent(produced_ok, planned),
        },
        velocity,
        remaining: RemainingSection {
            hours: estimate.hours,
            label: estimate.hours.map(format_hours),
            source: estimate.source,
            velocity_hours: estimate.velocity_hours,
            schedule_hours: estimate.schedule_hours,
            elapsed_hours: elapsed_hours(&remaining_input),
        },
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

fn resolve_identity(records: &ResolvedRecords<'_>) -> CardIdentity {
    let mut identity = CardIdentity::default();
    for (field, aliases, slots) in IDENTITY_CHAINS {
        *identity.slot_mut(*field) = first_text(records, slots, aliases);
    }
    identity
}

fn first_text(
    records: &ResolvedRecords<'_>,
    slots: &[SnapshotSlot],
    aliases: &[&str],
) -> Option<String> {
    records
        .in_order(slots)
        .into_iter()
        .find_map(|record| lookup_text(record, aliases))
}

fn first_positive(
    records: &ResolvedRecords<'_>,
    slots: &[SnapshotSlot],
    aliases: &[&str],
) -> Option<f64> {
    records
        .in_order(slots)
        .into_iter()
        .find_map(|record| lookup_number(record, aliases).filter(|v| *v > 0.0))
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

fn candidates_from(
    records: &ResolvedRecords<'_>,
    slots: &[SnapshotSlot],
    aliases: &[&str],
) -> Vec<Option<f64>> {
    slots
        .iter()
        .map(|slot| records.get(*slot).and_then(|record| lookup_number(record, aliases)))
        .collect()
}

/// Pick one count: the explicit counts structure first, then the snapshots.
///
/// Candidates are rounded to whole pieces before the pick, so a fraction
/// that rounds to zero is skipped like a zero.
fn pick_count(
    explicit: Option<u64>,
    records: &ResolvedRecords<'_>,
    slots: &[SnapshotSlot],
    aliases: &[&str],
) -> u64 {
    let mut candidates = vec![explicit.map(|v| v as f64)];
    candidates.extend(candidates_from(records, slots, aliases));
    let rounded: Vec<Option<f64>> = candidates
        .into_iter()
        .map(|c| c.map(f64::round))
        .collect();
    // `as` saturates oversized values at u64::MAX.
    pick_nonzero_count(&rounded).map_or(0, |v| v as u64)
}

fn assemble_counts(
    ok: u64,
    nok: u64,
    rework: u64,
    explicit_total: Option<u64>,
) -> ProductionCounts {
    let sum = ok.saturating_add(nok).saturating_add(rework);
    ProductionCounts {
        ok,
        nok,
        rework,
        total: explicit_total.filter(|t| *t >= sum).unwrap_or(sum),
    }
}

fn resolve_shift_counts(
    context: &DashboardContext,
    records: &ResolvedRecords<'_>,
) -> ProductionCounts {
    let explicit = context.shift_counts;
    assemble_counts(
        pick_count(explicit.map(|c| c.ok), records, SHIFT_COUNT_SOURCES, SHIFT_KPI_FIELDS.ok_count),
        pick_count(
            explicit.map(|c| c.nok),
            records,
            SHIFT_COUNT_SOURCES,
            SHIFT_KPI_FIELDS.nok_count,
        ),
        pick_count(explicit.map(|c| c.rework), records, SHIFT_COUNT_SOURCES, SHIFT_REWORK),
        explicit.map(|c| c.total),
    )
}

fn resolve_work_order_counts(
    context: &DashboardContext,
    records: &ResolvedRecords<'_>,
) -> ProductionCounts {
    let explicit = context.work_order_counts;
    assemble_counts(
        pick_count(explicit.map(|c| c.ok), records, WORK_ORDER_COUNT_SOURCES, WORK_ORDER_OK),
        pick_count(explicit.map(|c| c.nok), records, WORK_ORDER_COUNT_SOURCES, WORK_ORDER_NOK),
        pick_count(
            explicit.map(|c| c.rework),
            records,
            WORK_ORDER_COUNT_SOURCES,
            WORK_ORDER_REWORK,
        ),
        explicit.map(|c| c.total),
    )
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

fn merge_scope_kpis(
    records: &ResolvedRecords<'_>,
    sources: &[(SnapshotSlot, SourceProfile)],
    scope: Scope,
) -> KpiTuple {
    let tuples: Vec<KpiTuple> = sources
        .iter()
        .map(|(slot, profile)| {
            let tuple = records
                .get(*slot)
                .map(|record| resolve_record_kpis(record, profile))
                .unwrap_or_default();
            tracing::trace!(
                scope = scope.as_str(),
                source = profile.name,
                has_value = tuple.has_any_value(),
                "Resolved KPI source",
            );
            tuple
        })
        .collect();
    merge_kpis(&tuples)
}

/// Fill gaps left by the snapshots from counts and time accounting.
///
/// The derived tuple ranks below every snapshot.
fn with_derived_components(
    merged: KpiTuple,
    budget_availability: Option<f64>,
    counts: &ProductionCounts,
) -> KpiTuple {
    let availability = merged.availability.or(budget_availability);
    let quality = merged
        .quality
        .or_else(|| compute_quality(Some(counts.ok as f64), Some(counts.nok as f64)));
    let derived = KpiTuple {
        availability,
        quality,
        oee: compose_oee(availability, merged.performance_percent, quality),
        ..Default::default()
    };
    merge_kpis(&[merged, derived])
}

fn scope_section(scope: Scope, kpis: KpiTuple, counts: ProductionCounts) -> ScopeSection {
    ScopeSection {
        scope,
        oee_band: kpis.oee.map(OeeBand::from_oee),
        kpis,
        counts,
        scrap_percent: scrap_percent(&counts),
    }
}

// ---------------------------------------------------------------------------
// Progress and scrap
// ---------------------------------------------------------------------------

/// Share of the plan produced, capped at 100. `0` without a positive plan.
pub fn progress_percent(produced: f64, planned: f64) -> f64 {
    if !planned.is_finite() || planned <= 0.0 || !produced.is_finite() {
        return 0.0;
    }
    round1((produced / planned * 100.0).min(100.0)).max(0.0)
}

/// Share of non-conforming pieces among everything produced.
///
/// `None` (serialized as `null`) when nothing was produced yet.
pub fn scrap_percent(counts: &ProductionCounts) -> Option<f64> {
    let total = counts.ok as f64 + counts.nok as f64 + counts.rework as f64;
    if total <= 0.0 {
        return None;
    }
    normalize_percent(round1(counts.nok as f64 / total * 100.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
