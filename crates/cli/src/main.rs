//! `oee-cli` -- compute one OEE dashboard card.
//!
//! # Usage
//!
//! ```text
//! oee-cli [context.json | -]
//! ```
//!
//! | Variable         | Required | Default | Description                              |
//! |------------------|----------|---------|------------------------------------------|
//! | `OEE_INPUT`      | no       | `-`     | Context document path, `-` for stdin     |
//! | `OEE_NOW`        | no       | --      | RFC 3339 instant overriding `now`        |
//! | `OEE_PRETTY`     | no       | `false` | Pretty-print the card                    |
//! | `OEE_LOG_FORMAT` | no       | `text`  | `text` or `json` log lines on stderr     |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oee_cli::config::{CliConfig, LogFormat};

fn main() {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env(std::env::args().nth(1));

    // --- Tracing ---
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = config.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(2);
    });

    match oee_cli::run(&config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build dashboard card");
            std::process::exit(1);
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "oee_cli=info,oee_core=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
