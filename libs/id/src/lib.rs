//! # portal-id
//!
//! Typed hierarchical identifiers for portal entities.
//!
//! ## Design Principles
//!
//! - A [`Context`] is an immutable schema: ordered, named, pattern-validated
//!   components joined by separators
//! - An [`Id`] is always valid for its context; no partial IDs are returned
//! - IDs support roundtrip serialization (create → format → parse)
//! - IDs are typed (`Id<User>`, `Id<Group>`) to prevent mixing entity kinds
//!
//! ## ID Format
//!
//! Component values joined by per-component separators:
//!
//! - `container=portal=local=Hello=helloInstance` (portlet)
//! - `platform/administrators` (group)
//! - `somecontent_m:0` (managed content)
//! - `site:classic:home` (page of a site)
//!
//! ## Example
//!
//! ```
//! use portal_id::{entity::Group, Id, Ids};
//!
//! let ids = Ids::new().unwrap();
//! let admins = ids.group_id("platform", ["administrators"]).unwrap();
//! assert_eq!(admins.to_string(), "platform/administrators");
//!
//! let parsed: Id<Group> = ids.group().parse("platform/administrators").unwrap();
//! assert_eq!(parsed, admins);
//! ```

mod context;
mod definition;
pub mod entity;
mod error;
mod id;
mod macros;
mod registry;

pub use context::{Cardinality, ComponentSpec, Context, ContextBuilder, DEFAULT_SEPARATOR};
pub use definition::{ComponentDefinition, ContextDefinition, ContextDefinitions};
pub use entity::{Entity, EntityKind};
pub use error::{ErrorKind, IdError};
pub use id::{Id, IdSeed};
pub use registry::*;
