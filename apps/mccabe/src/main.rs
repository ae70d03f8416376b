//! # McCabe - McCabe-Thiele Stage Stepping
//!
//! The main binary for the McCabe-Thiele engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   apps/mccabe (THE BINARY)                  │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────┐    │
//! │  │    CLI      │    │  Run files  │    │  SVG render  │    │
//! │  │   (clap)    │    │   (toml)    │    │  (plotters)  │    │
//! │  └──────┬──────┘    └──────┬──────┘    └──────┬───────┘    │
//! │         │                  │                  │            │
//! │         └──────────────────┼──────────────────┘            │
//! │                            ▼                               │
//! │                    ┌───────────────┐                       │
//! │                    │  mccabe-core  │                       │
//! │                    │  (THE LOGIC)  │                       │
//! │                    └───────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Constant relative volatility, saturated liquid feed
//! mccabe stages --alpha 2.5 --xd 0.9 --xb 0.1 --xf 0.5 -R 2 --q 1
//!
//! # Peng-Robinson equilibrium at 1 bar, with a diagram
//! mccabe stages --comp1 benzene --comp2 toluene -P 1 --xd 0.95 --xb 0.05 --plot bt.svg
//!
//! # Pxy / Txy tables
//! mccabe vle --comp1 methanol --comp2 water -T 330 -P 1
//! ```

use clap::Parser;
use mccabe::cli;
use mccabe::output::{ErrorOutput, to_json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. MCCABE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MCCABE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose { "mccabe=debug" } else { "mccabe=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    let json_mode = cli.json_mode;
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        if json_mode {
            println!("{}", to_json(&ErrorOutput::from(&e)));
        }
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  McCabe-Thiele v{}
  y = f(x) | stages | feed | Peng-Robinson
"#,
        env!("CARGO_PKG_VERSION")
    );
}
