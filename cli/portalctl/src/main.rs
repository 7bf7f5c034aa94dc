//! portalctl - inspect portal identifier contexts
//!
//! Lists the registered contexts and creates, parses, and navigates IDs
//! against them. Extra contexts can be loaded from a TOML file of
//! `[[context]]` tables.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod commands;
mod config;
mod error;
mod output;

use commands::Cli;
use config::{Config, LogFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    init_tracing(&config);

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to stderr so command output stays machine-readable.
fn init_tracing(config: &Config) {
    // Prefer RUST_LOG, fall back to PORTAL_LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}
