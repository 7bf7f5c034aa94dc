//! CLI commands.

mod contexts;
mod id;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use portal_id::Ids;

use crate::config::build_registry;
use crate::output::OutputFormat;

/// portalctl - Inspect portal identifier contexts and IDs.
#[derive(Debug, Parser)]
#[command(name = "portalctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// TOML file with additional `[[context]]` definitions.
    #[arg(long, global = true, env = "PORTAL_CONTEXTS_FILE")]
    contexts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List and describe registered contexts.
    Contexts(contexts::ContextsCommand),

    /// Create, parse, and navigate IDs.
    Id(id::IdCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        if let Commands::Version = self.command {
            println!("portalctl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        let ids = build_registry(self.contexts.as_ref())?;
        let ctx = CommandContext {
            ids,
            format: self.format,
        };

        match self.command {
            Commands::Contexts(cmd) => cmd.run(ctx),
            Commands::Id(cmd) => cmd.run(ctx),
            Commands::Version => Ok(()),
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub ids: Ids,
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "portalctl",
            "id",
            "parse",
            "group",
            "platform/users",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Id(_)));
    }
}
