//! # portal-api
//!
//! Public API of the portal: sites, pages, navigation, permissions, and the
//! per-request facade.
//!
//! Every entity is addressed by a typed [`Id`](portal_id::Id) from the
//! well-known [`Ids`](portal_id::Ids) registry:
//!
//! - sites and pages: `site:classic`, `site:classic:home`
//! - users: `root`
//! - groups: `platform/administrators`
//!
//! Implementations of [`Portal`] live with the portal server; this crate only
//! declares the contract.

mod error;
mod navigation;
mod page;
mod portal;
mod query;
pub mod request;
mod security;
mod site;

pub use error::ApiError;
pub use navigation::{Navigation, Node, NodePath, Visibility};
pub use page::{Page, PageQuery};
pub use portal::Portal;
pub use query::Pagination;
pub use request::PortalRequest;
pub use security::{Membership, Permission, User, ANY_MEMBERSHIP};
pub use site::{Site, SiteQuery};

pub use portal_id::SiteType;

use portal_id::entity;
use portal_id::Id;

pub type SiteId = Id<entity::Site>;
pub type PageId = Id<entity::Page>;
pub type UserId = Id<entity::User>;
pub type GroupId = Id<entity::Group>;
