//! Context commands (registered ID schemas).

use std::fmt::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use portal_id::{Cardinality, ComponentSpec, Context, ContextDefinition};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_single, OutputFormat};

use super::CommandContext;

/// List and describe registered contexts.
#[derive(Debug, Args)]
pub struct ContextsCommand {
    #[command(subcommand)]
    command: ContextsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ContextsSubcommand {
    /// List registered contexts.
    List,

    /// Show the components of a context.
    Show {
        /// Context name.
        name: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ContextRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "COMPONENTS")]
    components: usize,
    #[tabled(rename = "SEPARATOR")]
    default_separator: String,
    #[tabled(rename = "TRUNCATES")]
    truncate_on_missing_optional: bool,
    #[tabled(rename = "SHAPE")]
    shape: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ComponentRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "OWNER")]
    owner: String,
    #[tabled(rename = "CARDINALITY")]
    cardinality: String,
    #[tabled(rename = "SEPARATOR")]
    separator: String,
    #[tabled(rename = "PATTERN")]
    pattern: String,
}

impl From<&Context> for ContextRow {
    fn from(context: &Context) -> Self {
        Self {
            name: context.name().to_string(),
            components: context.components().len(),
            default_separator: context.default_separator().to_string(),
            truncate_on_missing_optional: context.truncates_on_missing_optional(),
            shape: shape(context),
        }
    }
}

/// Renders the layout of a context, e.g. `<root>[/<root>...]`.
///
/// Optional components nest in brackets since parsing stops at the first
/// absent one.
fn shape(context: &Context) -> String {
    let mut out = String::new();
    let mut open = 0;
    let mut previous: Option<&ComponentSpec> = None;

    for spec in context.components() {
        let separator = previous.map(ComponentSpec::separator).unwrap_or_default();
        let name = spec.name();
        // Writing to a String cannot fail.
        let _ = match spec.cardinality() {
            Cardinality::Required => write!(out, "{separator}<{name}>"),
            Cardinality::Optional => {
                open += 1;
                write!(out, "[{separator}<{name}>")
            }
            Cardinality::Repeatable => write!(
                out,
                "{separator}<{name}>[{}<{name}>...]",
                spec.separator()
            ),
        };
        previous = Some(spec);
    }

    out.push_str(&"]".repeat(open));
    out
}

impl ComponentRow {
    fn new(position: usize, spec: &ComponentSpec) -> Self {
        Self {
            position,
            name: spec.name().to_string(),
            owner: spec.owner().to_string(),
            cardinality: spec.cardinality().to_string(),
            separator: spec.separator().to_string(),
            pattern: spec.pattern().to_string(),
        }
    }
}

impl ContextsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ContextsSubcommand::List => list(ctx),
            ContextsSubcommand::Show { name } => show(ctx, &name),
        }
    }
}

fn list(ctx: CommandContext) -> Result<()> {
    let rows: Vec<ContextRow> = ctx
        .ids
        .contexts()
        .map(|context| ContextRow::from(context.as_ref()))
        .collect();
    print_output(&rows, ctx.format);
    Ok(())
}

fn show(ctx: CommandContext, name: &str) -> Result<()> {
    let context = ctx.ids.require(name)?;

    match ctx.format {
        OutputFormat::Json => print_single(&ContextDefinition::describe(context)),
        OutputFormat::Table => {
            println!("{}", shape(context));
            let rows: Vec<ComponentRow> = context
                .components()
                .iter()
                .enumerate()
                .map(|(position, spec)| ComponentRow::new(position, spec))
                .collect();
            print_output(&rows, ctx.format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use portal_id::Ids;

    use super::*;

    #[test]
    fn test_shape_of_well_known_contexts() {
        let ids = Ids::new().unwrap();
        assert_eq!(shape(ids.group()), "<root>[/<root>...]");
        assert_eq!(shape(ids.user()), "<userName>");
        assert_eq!(
            shape(ids.portlet()),
            "<containerComponent>=<portalComponent>[=<invokerComponent>\
             [=<portletComponent>[=<instanceComponent>]]]"
        );
        assert_eq!(shape(ids.site()), "<siteType>:<siteName>[:<pageName>]");
    }

    #[test]
    fn test_context_row() {
        let ids = Ids::new().unwrap();
        let row = ContextRow::from(ids.portlet().as_ref());
        assert_eq!(row.name, "portlet");
        assert_eq!(row.components, 5);
        assert_eq!(row.default_separator, "=");
        assert!(row.truncate_on_missing_optional);
    }
}
