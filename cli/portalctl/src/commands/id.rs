//! ID commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use portal_id::entity::PortalObject;
use portal_id::Id;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_info, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Create, parse, and navigate IDs.
#[derive(Debug, Args)]
pub struct IdCommand {
    #[command(subcommand)]
    command: IdSubcommand,
}

#[derive(Debug, Subcommand)]
enum IdSubcommand {
    /// Parse an ID and show its components.
    Parse {
        /// Context name.
        context: String,
        /// Serialized ID.
        id: String,
    },

    /// Create an ID from component values, in order.
    Create {
        /// Context name.
        context: String,
        /// Component values.
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Extend an ID by one component value.
    Child {
        /// Context name.
        context: String,
        /// Serialized parent ID.
        id: String,
        /// Value for the next component.
        value: String,
    },

    /// Drop the deepest component of an ID.
    Parent {
        /// Context name.
        context: String,
        /// Serialized ID.
        id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ComponentRow {
    #[tabled(rename = "COMPONENT")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Debug, Serialize)]
struct IdView {
    context: String,
    id: String,
    owner: Option<String>,
    components: Vec<ComponentRow>,
}

impl From<&Id<PortalObject>> for IdView {
    fn from(id: &Id<PortalObject>) -> Self {
        Self {
            context: id.context().name().to_string(),
            id: id.to_string(),
            owner: id.owner().map(|kind| kind.to_string()),
            components: id
                .components()
                .map(|(name, value)| ComponentRow {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

impl IdCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            IdSubcommand::Parse { context, id } => parse(ctx, &context, &id),
            IdSubcommand::Create { context, values } => create(ctx, &context, values),
            IdSubcommand::Child { context, id, value } => child(ctx, &context, &id, value),
            IdSubcommand::Parent { context, id } => parent(ctx, &context, &id),
        }
    }
}

fn parse(ctx: CommandContext, context: &str, candidate: &str) -> Result<()> {
    let id: Id<PortalObject> = ctx.ids.parse_in(context, candidate)?;
    let view = IdView::from(&id);

    match ctx.format {
        OutputFormat::Json => print_single(&view),
        OutputFormat::Table => print_output(&view.components, ctx.format),
    }
    Ok(())
}

fn create(ctx: CommandContext, context: &str, values: Vec<String>) -> Result<()> {
    let id: Id<PortalObject> = ctx.ids.require(context)?.create(values)?;
    print_id(&id, ctx.format);
    Ok(())
}

fn child(ctx: CommandContext, context: &str, candidate: &str, value: String) -> Result<()> {
    let id: Id<PortalObject> = ctx.ids.parse_in(context, candidate)?;
    let child: Id<PortalObject> = id.child(value)?;
    print_id(&child, ctx.format);
    Ok(())
}

fn parent(ctx: CommandContext, context: &str, candidate: &str) -> Result<()> {
    let id: Id<PortalObject> = ctx.ids.parse_in(context, candidate)?;

    match id.parent::<PortalObject>() {
        Some(parent) => print_id(&parent, ctx.format),
        None => match ctx.format {
            OutputFormat::Json => print_single(&serde_json::Value::Null),
            OutputFormat::Table => print_info(&format!("'{id}' has no parent")),
        },
    }
    Ok(())
}

fn print_id(id: &Id<PortalObject>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_single(&IdView::from(id)),
        OutputFormat::Table => println!("{id}"),
    }
}
