//! Pages and page queries.

use portal_id::{SiteType, PAGE_COMPONENT_NAME};
use serde::Serialize;

use crate::query::{paginate, Pagination};
use crate::site::site_type_of;
use crate::{Permission, PageId, SiteId};

/// A page of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    id: PageId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub access_permission: Permission,
    pub edit_permission: Permission,
}

impl Page {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            access_permission: Permission::Everyone,
            edit_permission: Permission::Everyone,
        }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.component(PAGE_COMPONENT_NAME).unwrap_or_default()
    }

    /// ID of the site owning this page.
    pub fn site_id(&self) -> Option<SiteId> {
        self.id.parent()
    }
}

/// Filter for [`Portal::find_pages`](crate::Portal::find_pages).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub site_id: Option<SiteId>,
    pub site_type: Option<SiteType>,
    /// Case-insensitive substring of the page title.
    pub title: Option<String>,
    pub pagination: Option<Pagination>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site_id(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_type = Some(site_type);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn matches(&self, page: &Page) -> bool {
        let site_id = page.site_id();

        if let Some(expected) = &self.site_id {
            if site_id.as_ref() != Some(expected) {
                return false;
            }
        }
        if let Some(expected) = self.site_type {
            if site_id.as_ref().and_then(site_type_of) != Some(expected) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            let needle = title.to_lowercase();
            let matched = page
                .title
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            if !matched {
                return false;
            }
        }
        true
    }

    /// Sorts by ID string and applies pagination.
    pub fn finish(&self, mut pages: Vec<Page>) -> Vec<Page> {
        pages.sort_by_key(|page| page.id.to_string());
        paginate(pages, self.pagination.as_ref())
    }
}
