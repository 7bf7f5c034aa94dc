//! Declarative context definitions.
//!
//! A [`ContextDefinition`] describes a context as plain data so schemas can be
//! loaded from configuration files and rendered back out. Building one goes
//! through [`ContextBuilder`], so the same build-time validation applies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::{Cardinality, Context, ContextBuilder, DEFAULT_SEPARATOR};
use crate::entity::EntityKind;
use crate::IdError;

/// Serializable description of a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextDefinition {
    /// Scheme name.
    pub name: String,

    /// Separator for components that do not set their own.
    #[serde(default = "default_separator")]
    pub default_separator: String,

    /// Stop parsing at the first absent optional component.
    #[serde(default)]
    pub truncate_on_missing_optional: bool,

    /// Components in address order.
    pub components: Vec<ComponentDefinition>,
}

/// Serializable description of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDefinition {
    pub name: String,

    #[serde(default = "default_owner")]
    pub owner: EntityKind,

    /// Regular expression the whole value must match.
    pub pattern: String,

    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,

    /// Separator override for this component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_owner() -> EntityKind {
    EntityKind::PortalObject
}

fn default_cardinality() -> Cardinality {
    Cardinality::Required
}

impl ContextDefinition {
    /// Builds the described context.
    pub fn build(&self) -> Result<Arc<Context>, IdError> {
        let mut builder = ContextBuilder::new(self.name.clone())
            .with_default_separator(self.default_separator.clone());

        for component in &self.components {
            builder = builder.component(
                component.name.clone(),
                component.owner,
                component.pattern.clone(),
                component.cardinality,
            );
            if let Some(separator) = &component.separator {
                builder = builder.with_component_separator(separator.clone());
            }
        }

        if self.truncate_on_missing_optional {
            builder = builder.ignore_remaining_after_first_missing_optional();
        }

        builder.build()
    }

    /// Describes an existing context.
    ///
    /// Separators equal to the context default are left implicit.
    pub fn describe(context: &Context) -> Self {
        let components = context
            .components()
            .iter()
            .map(|spec| ComponentDefinition {
                name: spec.name().to_string(),
                owner: spec.owner(),
                pattern: spec.pattern().to_string(),
                cardinality: spec.cardinality(),
                separator: (spec.separator() != context.default_separator())
                    .then(|| spec.separator().to_string()),
            })
            .collect();

        Self {
            name: context.name().to_string(),
            default_separator: context.default_separator().to_string(),
            truncate_on_missing_optional: context.truncates_on_missing_optional(),
            components,
        }
    }
}

/// A set of definitions, as stored in a file of `[[context]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDefinitions {
    #[serde(default, rename = "context")]
    pub contexts: Vec<ContextDefinition>,
}

impl IntoIterator for ContextDefinitions {
    type Item = ContextDefinition;
    type IntoIter = std::vec::IntoIter<ContextDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.contexts.into_iter()
    }
}
