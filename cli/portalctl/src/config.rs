//! Configuration for portalctl.
//!
//! Handles:
//! - Log level and format
//! - Loading extra context definitions from a TOML file, either given
//!   explicitly or found in the user config directory

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use portal_id::{ContextDefinitions, Ids};
use tracing::debug;

use crate::error::CliError;

/// Contexts file looked up in the config directory.
const CONTEXTS_FILE: &str = "contexts.toml";

/// Get the config directory path.
fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "portal", "portalctl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// `contexts.toml` in the config directory, if present.
fn default_contexts_file() -> Option<PathBuf> {
    config_dir()
        .map(|dir| dir.join(CONTEXTS_FILE))
        .filter(|path| path.exists())
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The contexts file is read by clap from `PORTAL_CONTEXTS_FILE`.
    pub fn from_env() -> Self {
        let log_level = std::env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        let log_format = match std::env::var("PORTAL_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            log_level,
            log_format,
        }
    }
}

/// Read context definitions from a TOML file of `[[context]]` tables.
pub fn load_definitions(path: &Path) -> Result<ContextDefinitions> {
    if !path.exists() {
        return Err(CliError::ContextsFileNotFound(path.to_path_buf()).into());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read contexts from {:?}", path))?;

    parse_definitions(&contents)
        .with_context(|| format!("Failed to parse contexts from {:?}", path))
}

fn parse_definitions(contents: &str) -> Result<ContextDefinitions> {
    Ok(toml::from_str(contents)?)
}

/// Build the registry, adding the definitions from `contexts_file`, or from
/// the config directory's `contexts.toml` when no file is given.
pub fn build_registry(contexts_file: Option<&PathBuf>) -> Result<Ids> {
    let Some(path) = contexts_file.cloned().or_else(default_contexts_file) else {
        return Ok(Ids::new()?);
    };

    let definitions = load_definitions(&path)?;
    debug!(
        path = %path.display(),
        count = definitions.contexts.len(),
        "loaded context definitions"
    );
    Ok(Ids::with_definitions(definitions)?)
}
