//! Command-line front end for the OEE engine.
//!
//! Reads one dashboard context document (JSON) from a file or stdin,
//! builds the dashboard card and renders it as JSON.

pub mod config;
pub mod error;

use std::io::Read;

use chrono::{DateTime, Utc};
use oee_core::{build_dashboard_card, DashboardCard, DashboardContext};

use crate::config::{CliConfig, InputSource};
use crate::error::CliError;

/// Read and validate the context document.
pub fn load_context(source: &InputSource) -> Result<DashboardContext, CliError> {
    let raw = match source {
        InputSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        InputSource::File(path) => std::fs::read_to_string(path)?,
    };
    parse_context(&raw)
}

/// Parse and validate a context document from text.
pub fn parse_context(raw: &str) -> Result<DashboardContext, CliError> {
    let document: serde_json::Value = serde_json::from_str(raw)?;
    Ok(DashboardContext::from_json(document)?)
}

/// The instant a card is computed for.
///
/// The configured override wins over the document; the wall clock is read
/// only when neither provides one.
pub fn effective_now(config: &CliConfig, context: &DashboardContext) -> DateTime<Utc> {
    config
        .now_override
        .or(context.now)
        .unwrap_or_else(Utc::now)
}

/// Serialize a card according to the configuration.
pub fn render_card(card: &DashboardCard, pretty: bool) -> Result<String, CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(card)?
    } else {
        serde_json::to_string(card)?
    };
    Ok(rendered)
}

/// Load, build and render one card.
pub fn run(config: &CliConfig) -> Result<String, CliError> {
    let context = load_context(&config.input)?;
    let now = effective_now(config, &context);
    tracing::info!(input = ?config.input, %now, "Building dashboard card");

    let card = build_dashboard_card(&context, now);
    tracing::info!(
        machine = card.identity.machine_code.as_deref().unwrap_or("-"),
        shift_oee = ?card.shift.kpis.oee,
        remaining_hours = ?card.remaining.hours,
        "Dashboard card ready",
    );

    render_card(&card, config.pretty)
}
