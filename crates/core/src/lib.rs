//! Canonical OEE metrics from heterogeneous manufacturing telemetry.
//!
//! Every function in this crate is synchronous and pure: snapshots, counts
//! and the current instant are passed in, a new value comes out. Fetching,
//! caching and polling belong to the caller.

pub mod aliases;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod kpi;
pub mod percent;
pub mod remaining_time;
pub mod resolver;
pub mod snapshot;
pub mod types;
pub mod units;

pub use context::DashboardContext;
pub use dashboard::{build_dashboard_card, DashboardCard};
pub use error::CoreError;
pub use kpi::{merge_kpis, KpiTuple};
pub use remaining_time::{estimate_remaining_hours, RemainingTimeInput};
