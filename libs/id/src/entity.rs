//! Entity kinds and marker types.
//!
//! Every component of a context names the kind of entity it addresses. The
//! same kinds exist as zero-sized marker types so that an [`Id`](crate::Id)
//! can be tagged at compile time with what it points at (`Id<User>` vs
//! `Id<Group>`). The tag carries no runtime behavior.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::define_entity;

/// Kind of entity a component or ID addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    PortalContainer,
    Portal,
    /// Anything without a dedicated kind (invokers, portlets, instances).
    PortalObject,
    User,
    Group,
    Application,
    Content,
    ManagedContent,
    Site,
    Page,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::PortalContainer,
        EntityKind::Portal,
        EntityKind::PortalObject,
        EntityKind::User,
        EntityKind::Group,
        EntityKind::Application,
        EntityKind::Content,
        EntityKind::ManagedContent,
        EntityKind::Site,
        EntityKind::Page,
    ];

    /// Returns the snake_case name of this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PortalContainer => "portal_container",
            EntityKind::Portal => "portal",
            EntityKind::PortalObject => "portal_object",
            EntityKind::User => "user",
            EntityKind::Group => "group",
            EntityKind::Application => "application",
            EntityKind::Content => "content",
            EntityKind::ManagedContent => "managed_content",
            EntityKind::Site => "site",
            EntityKind::Page => "page",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile-time tag for the entity an [`Id`](crate::Id) addresses.
pub trait Entity: 'static {
    /// Runtime kind matching this marker.
    const KIND: EntityKind;
}

// =============================================================================
// Containers and Portals
// =============================================================================

define_entity!(
    /// A portal container hosting one or more portals.
    PortalContainer,
    PortalContainer
);
define_entity!(
    /// A portal within a container.
    Portal,
    Portal
);
define_entity!(
    /// Generic portal object (portlet invoker, portlet, portlet instance).
    PortalObject,
    PortalObject
);

// =============================================================================
// Organization
// =============================================================================

define_entity!(
    /// A portal user.
    User,
    User
);
define_entity!(
    /// A group in the organization hierarchy.
    Group,
    Group
);

// =============================================================================
// Content
// =============================================================================

define_entity!(
    /// A deployed application exposing portlets.
    Application,
    Application
);
define_entity!(
    /// A piece of content (portlet, gadget, remote portlet).
    Content,
    Content
);

/// Content placed under management by the portal, tagged with the kind of
/// content it wraps.
pub struct ManagedContent<T>(PhantomData<fn() -> T>);

impl<T: 'static> Entity for ManagedContent<T> {
    const KIND: EntityKind = EntityKind::ManagedContent;
}

impl<T> fmt::Debug for ManagedContent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ManagedContent")
    }
}

// =============================================================================
// Sites and Pages
// =============================================================================

define_entity!(
    /// A site (portal site, group space, or user dashboard).
    Site,
    Site
);
define_entity!(
    /// A page of a site.
    Page,
    Page
);
