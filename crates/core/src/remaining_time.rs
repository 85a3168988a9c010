//! Remaining production time estimation.
//!
//! Two independent estimates are combined conservatively:
//!
//! - **velocity**: pieces still to produce divided by a base speed chosen by
//!   priority (work-order speed, then shift speed capped by the 85% target,
//!   then the target alone, then 85% of nominal);
//! - **schedule**: hours until the first scheduled end date still in the
//!   future (estimated, then planned, then actual end).
//!
//! When both are positive the smaller one is reported, so completion is
//! never promised earlier than either signal allows. `now` is always an
//! explicit input; nothing here reads the clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;
use crate::units::{SECS_PER_HOUR, TARGET_SPEED_RATIO};

/// Naive datetime layouts accepted for schedule fields (read as UTC).
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the estimator needs, already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingTimeInput {
    pub planned: f64,
    pub produced_ok: f64,
    #[serde(default)]
    pub work_order_uph: Option<f64>,
    #[serde(default)]
    pub shift_uph: Option<f64>,
    #[serde(default)]
    pub nominal_uph: Option<f64>,
    #[serde(default)]
    pub target85_uph: Option<f64>,
    #[serde(default)]
    pub planned_end_date: Option<String>,
    #[serde(default)]
    pub actual_start_date: Option<String>,
    #[serde(default)]
    pub actual_end_date: Option<String>,
    #[serde(default)]
    pub estimated_end_date: Option<String>,
    pub now: Timestamp,
}

impl RemainingTimeInput {
    /// An input with no speeds and no schedule.
    pub fn new(planned: f64, produced_ok: f64, now: Timestamp) -> Self {
        Self {
            planned,
            produced_ok,
            work_order_uph: None,
            shift_uph: None,
            nominal_uph: None,
            target85_uph: None,
            planned_end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            estimated_end_date: None,
            now,
        }
    }

    /// End-date candidates in priority order.
    fn end_date_candidates(&self) -> [Option<&str>; 3] {
        [
            self.estimated_end_date.as_deref(),
            self.planned_end_date.as_deref(),
            self.actual_end_date.as_deref(),
        ]
    }
}

/// Which signal produced the final remaining-time figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainingTimeSource {
    /// The planned quantity is already produced.
    Completed,
    Velocity,
    Schedule,
    /// Every scheduled end date is already past.
    Due,
    Unknown,
}

/// Remaining time with the intermediate estimates that led to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemainingTimeEstimate {
    pub hours: Option<f64>,
    pub velocity_hours: Option<f64>,
    pub schedule_hours: f64,
    pub base_speed_uph: Option<f64>,
    pub source: RemainingTimeSource,
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 schedule value.
///
/// Offsets are honoured; values without an offset are read as UTC, and a
/// bare date means midnight UTC. Anything else is unusable.
pub fn parse_schedule_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Velocity estimate
// ---------------------------------------------------------------------------

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Choose the speed the remaining pieces will be produced at.
pub fn select_base_speed(input: &RemainingTimeInput) -> Option<f64> {
    if let Some(wo) = positive(input.work_order_uph) {
        return Some(wo);
    }
    match (positive(input.shift_uph), positive(input.target85_uph)) {
        (Some(shift), Some(target)) => Some(shift.min(target)),
        (Some(shift), None) => Some(shift),
        (None, Some(target)) => Some(target),
        (None, None) => positive(input.nominal_uph).map(|n| n * TARGET_SPEED_RATIO),
    }
}

/// Hours needed at the base speed; `Some(0.0)` when already complete.
pub fn estimate_hours_from_velocity(input: &RemainingTimeInput) -> Option<f64> {
    let remaining = (input.planned - input.produced_ok).max(0.0);
    if !remaining.is_finite() {
        return None;
    }
    if remaining <= 0.0 {
        return Some(0.0);
    }
    select_base_speed(input).map(|speed| remaining / speed)
}

// ---------------------------------------------------------------------------
// Schedule estimate
// ---------------------------------------------------------------------------

/// Hours until the first end-date candidate still in the future.
///
/// Absent, unparseable and past candidates are skipped; with none left the
/// work is treated as due now (`0.0`), never negative.
pub fn estimate_hours_from_dates(input: &RemainingTimeInput) -> f64 {
    input
        .end_date_candidates()
        .into_iter()
        .flatten()
        .filter_map(parse_schedule_date)
        .find(|end| *end > input.now)
        .map(|end| hours_between(input.now, end))
        .unwrap_or(0.0)
}

/// Whether any end-date candidate parses at all.
fn has_schedule(input: &RemainingTimeInput) -> bool {
    input
        .end_date_candidates()
        .into_iter()
        .flatten()
        .any(|raw| parse_schedule_date(raw).is_some())
}

fn hours_between(from: Timestamp, to: Timestamp) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0 / SECS_PER_HOUR
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Combine both estimates, keeping the intermediate values.
pub fn estimate_remaining(input: &RemainingTimeInput) -> RemainingTimeEstimate {
    let velocity_hours = estimate_hours_from_velocity(input);
    let schedule_hours = estimate_hours_from_dates(input);
    let base_speed_uph = select_base_speed(input);

    let (hours, source) = match velocity_hours {
        Some(v) if v <= 0.0 => (Some(0.0), RemainingTimeSource::Completed),
        Some(v) if schedule_hours > 0.0 => {
            if schedule_hours < v {
                (Some(schedule_hours), RemainingTimeSource::Schedule)
            } else {
                (Some(v), RemainingTimeSource::Velocity)
            }
        }
        Some(v) => (Some(v), RemainingTimeSource::Velocity),
        None if schedule_hours > 0.0 => (Some(schedule_hours), RemainingTimeSource::Schedule),
        None if has_schedule(input) => (Some(0.0), RemainingTimeSource::Due),
        None => (None, RemainingTimeSource::Unknown),
    };

    RemainingTimeEstimate {
        hours,
        velocity_hours,
        schedule_hours,
        base_speed_uph,
        source,
    }
}

/// Remaining hours; `None` when genuinely unknown, `0.0` when due or done.
pub fn estimate_remaining_hours(input: &RemainingTimeInput) -> Option<f64> {
    estimate_remaining(input).hours
}

/// Hours elapsed since the actual start, up to the actual end or `now`.
pub fn elapsed_hours(input: &RemainingTimeInput) -> Option<f64> {
    let start = parse_schedule_date(input.actual_start_date.as_deref()?)?;
    let end = input
        .actual_end_date
        .as_deref()
        .and_then(parse_schedule_date)
        .unwrap_or(input.now);
    Some(hours_between(start, end).max(0.0))
}

/// Render hours as `"2h 30m"` or `"45m"`.
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0m".to_string();
    }
    let minutes = (hours * 60.0).round() as u64;
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn iso(ts: Timestamp) -> String {
        ts.to_rfc3339()
    }

    // -- parse_schedule_date ----------------------------------------------

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_schedule_date("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_datetime_as_utc() {
        let ts = parse_schedule_date("2024-03-01 12:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let ts = parse_schedule_date("2024-03-02").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_schedule_date("").is_none());
        assert!(parse_schedule_date("tomorrow").is_none());
        assert!(parse_schedule_date("2024-13-45").is_none());
    }

    // -- velocity ---------------------------------------------------------

    #[test]
    fn completed_work_is_zero_regardless_of_speed() {
        let mut input = RemainingTimeInput::new(1000.0, 1000.0, now());
        input.work_order_uph = Some(100.0);
        assert_eq!(estimate_hours_from_velocity(&input), Some(0.0));
        assert_eq!(estimate_remaining_hours(&input), Some(0.0));

        input.produced_ok = 1200.0;
        assert_eq!(estimate_remaining_hours(&input), Some(0.0));
    }

    #[test]
    fn work_order_speed_has_priority() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.work_order_uph = Some(100.0);
        input.shift_uph = Some(50.0);
        assert_eq!(estimate_remaining_hours(&input), Some(10.0));
    }

    #[test]
    fn shift_speed_capped_by_target() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.shift_uph = Some(250.0);
        input.target85_uph = Some(200.0);
        assert_eq!(select_base_speed(&input), Some(200.0));

        input.shift_uph = Some(125.0);
        assert_eq!(select_base_speed(&input), Some(125.0));
    }

    #[test]
    fn either_shift_or_target_alone() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.shift_uph = Some(80.0);
        assert_eq!(select_base_speed(&input), Some(80.0));

        input.shift_uph = Some(0.0);
        input.target85_uph = Some(90.0);
        assert_eq!(select_base_speed(&input), Some(90.0));
    }

    #[test]
    fn nominal_fallback_uses_85_percent() {
        let mut input = RemainingTimeInput::new(850.0, 0.0, now());
        input.nominal_uph = Some(100.0);
        let hours = estimate_hours_from_velocity(&input).unwrap();
        assert!((hours - 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_positive_speed_is_undefined() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.work_order_uph = Some(0.0);
        input.nominal_uph = Some(-3.0);
        assert_eq!(estimate_hours_from_velocity(&input), None);
    }

    // -- schedule ---------------------------------------------------------

    #[test]
    fn schedule_uses_first_future_candidate() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.estimated_end_date = Some(iso(now() - Duration::hours(1)));
        input.planned_end_date = Some(iso(now() + Duration::hours(3)));
        input.actual_end_date = Some(iso(now() + Duration::hours(8)));
        assert_eq!(estimate_hours_from_dates(&input), 3.0);
    }

    #[test]
    fn unparseable_candidate_falls_through() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.estimated_end_date = Some("soon".to_string());
        input.planned_end_date = Some(iso(now() + Duration::minutes(90)));
        assert_eq!(estimate_hours_from_dates(&input), 1.5);
    }

    #[test]
    fn no_future_candidate_is_zero() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        assert_eq!(estimate_hours_from_dates(&input), 0.0);
        input.estimated_end_date = Some(iso(now()));
        assert_eq!(estimate_hours_from_dates(&input), 0.0);
    }

    // -- composition ------------------------------------------------------

    #[test]
    fn smaller_estimate_wins() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.work_order_uph = Some(100.0);
        input.estimated_end_date = Some(iso(now() + Duration::hours(5)));
        let estimate = estimate_remaining(&input);
        assert_eq!(estimate.hours, Some(5.0));
        assert_eq!(estimate.velocity_hours, Some(10.0));
        assert_eq!(estimate.source, RemainingTimeSource::Schedule);
    }

    #[test]
    fn velocity_wins_when_shorter() {
        let mut input = RemainingTimeInput::new(100.0, 0.0, now());
        input.work_order_uph = Some(100.0);
        input.estimated_end_date = Some(iso(now() + Duration::hours(5)));
        let estimate = estimate_remaining(&input);
        assert_eq!(estimate.hours, Some(1.0));
        assert_eq!(estimate.source, RemainingTimeSource::Velocity);
    }

    #[test]
    fn past_schedule_without_velocity_is_due() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.estimated_end_date = Some(iso(now() - Duration::hours(2)));
        let estimate = estimate_remaining(&input);
        assert_eq!(estimate.hours, Some(0.0));
        assert_eq!(estimate.source, RemainingTimeSource::Due);
    }

    #[test]
    fn past_schedule_with_velocity_uses_velocity() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.work_order_uph = Some(250.0);
        input.planned_end_date = Some(iso(now() - Duration::hours(2)));
        assert_eq!(estimate_remaining_hours(&input), Some(4.0));
    }

    #[test]
    fn nothing_known_is_undefined() {
        let input = RemainingTimeInput::new(1000.0, 0.0, now());
        let estimate = estimate_remaining(&input);
        assert_eq!(estimate.hours, None);
        assert_eq!(estimate.source, RemainingTimeSource::Unknown);
    }

    #[test]
    fn schedule_alone_when_velocity_unknown() {
        let mut input = RemainingTimeInput::new(1000.0, 0.0, now());
        input.planned_end_date = Some(iso(now() + Duration::hours(6)));
        assert_eq!(estimate_remaining_hours(&input), Some(6.0));
    }

    // -- elapsed / formatting ---------------------------------------------

    #[test]
    fn elapsed_runs_until_now_or_actual_end() {
        let mut input = RemainingTimeInput::new(0.0, 0.0, now());
        assert_eq!(elapsed_hours(&input), None);

        input.actual_start_date = Some(iso(now() - Duration::hours(4)));
        assert_eq!(elapsed_hours(&input), Some(4.0));

        input.actual_end_date = Some(iso(now() - Duration::hours(1)));
        assert_eq!(elapsed_hours(&input), Some(3.0));
    }

    #[test]
    fn elapsed_never_negative() {
        let mut input = RemainingTimeInput::new(0.0, 0.0, now());
        input.actual_start_date = Some(iso(now() + Duration::hours(2)));
        assert_eq!(elapsed_hours(&input), Some(0.0));
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_hours(2.5), "2h 30m");
        assert_eq!(format_hours(0.75), "45m");
        assert_eq!(format_hours(0.0), "0m");
        assert_eq!(format_hours(-1.0), "0m");
    }

    #[test]
    fn input_deserializes_with_optional_fields_missing() {
        let input: RemainingTimeInput = serde_json::from_value(serde_json::json!({
            "planned": 10.0,
            "produced_ok": 2.0,
            "now": "2024-03-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(input, RemainingTimeInput::new(10.0, 2.0, now()));
    }
}
