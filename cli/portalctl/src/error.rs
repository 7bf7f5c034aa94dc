//! Error handling and display for the CLI.

use std::path::PathBuf;

use colored::Colorize;
use portal_id::IdError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Contexts file not found: {}", .0.display())]
    ContextsFileNotFound(PathBuf),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(CliError::ContextsFileNotFound(_)) = err.downcast_ref::<CliError>() {
        eprintln!(
            "\n{}",
            "Hint: Check --contexts or PORTAL_CONTEXTS_FILE.".yellow()
        );
    }

    if let Some(id_error) = err.downcast_ref::<IdError>() {
        if let Some(hint) = hint_for(id_error) {
            eprintln!("\n{}", hint.yellow());
        }
    }
}

fn hint_for(err: &IdError) -> Option<String> {
    match err {
        IdError::UnknownContext(_) => {
            Some("Hint: Run `portalctl contexts list` to see registered contexts.".to_string())
        }
        IdError::PatternMismatch {
            context, component, ..
        }
        | IdError::InvalidSegment {
            context, component, ..
        } => Some(format!(
            "Hint: Run `portalctl contexts show {context}` to see the pattern for '{component}'."
        )),
        _ if err.is_configuration_error() => {
            Some("Hint: Fix the context definition and try again.".to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_for_unknown_context() {
        let hint = hint_for(&IdError::UnknownContext("nope".to_string())).unwrap();
        assert!(hint.contains("contexts list"));
    }

    #[test]
    fn test_no_hint_for_trailing_content() {
        let err = IdError::TrailingContent {
            context: "user".to_string(),
            trailing: "x".to_string(),
            input: "ax".to_string(),
        };
        assert!(hint_for(&err).is_none());
    }
}
