//! Sites and site queries.

use portal_id::{SiteType, SITE_NAME_COMPONENT_NAME, SITE_TYPE_COMPONENT_NAME};
use serde::Serialize;

use crate::query::{paginate, Pagination};
use crate::{Permission, SiteId};

/// A portal site, group space, or user dashboard.
///
/// A site returned by [`Portal::create_site`](crate::Portal::create_site) is
/// not stored until it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    id: SiteId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
    pub access_permission: Permission,
    pub edit_permission: Permission,
}

impl Site {
    pub fn new(id: SiteId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            locale: None,
            access_permission: Permission::Everyone,
            edit_permission: Permission::Everyone,
        }
    }

    pub fn id(&self) -> &SiteId {
        &self.id
    }

    pub fn site_type(&self) -> Option<SiteType> {
        site_type_of(&self.id)
    }

    pub fn name(&self) -> &str {
        self.id.component(SITE_NAME_COMPONENT_NAME).unwrap_or_default()
    }

    /// Title, falling back to the site name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.name())
    }
}

pub(crate) fn site_type_of(id: &SiteId) -> Option<SiteType> {
    id.component(SITE_TYPE_COMPONENT_NAME)?.parse().ok()
}

/// Filter for [`Portal::find_sites`](crate::Portal::find_sites).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteQuery {
    /// Site types to include; empty means all.
    pub site_types: Vec<SiteType>,
    /// Include sites without any page.
    pub include_empty_sites: bool,
    pub pagination: Option<Pagination>,
}

impl SiteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_types.push(site_type);
        self
    }

    pub fn include_empty_sites(mut self, include: bool) -> Self {
        self.include_empty_sites = include;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Returns true if `site` passes the type filter.
    pub fn matches(&self, site: &Site) -> bool {
        self.site_types.is_empty()
            || site
                .site_type()
                .is_some_and(|site_type| self.site_types.contains(&site_type))
    }

    /// Sorts by ID string and applies pagination.
    pub fn finish(&self, mut sites: Vec<Site>) -> Vec<Site> {
        sites.sort_by_key(|site| site.id.to_string());
        paginate(sites, self.pagination.as_ref())
    }
}
