//! The main interface of the public portal API.

use crate::{
    ApiError, Navigation, Page, PageId, PageQuery, Permission, Site, SiteId, SiteQuery, User,
};

/// Site, page, and navigation access for one portal.
///
/// Obtained from the current [`PortalRequest`](crate::PortalRequest).
/// Entities returned by `create_*` are not stored until saved.
pub trait Portal: Send + Sync {
    /// Returns the site, or `None` if it does not exist.
    fn get_site(&self, site_id: &SiteId) -> Result<Option<Site>, ApiError>;

    /// Creates an unsaved site.
    ///
    /// Fails with [`ApiError::AlreadyExists`] if the site exists.
    fn create_site(&self, site_id: SiteId) -> Result<Site, ApiError>;

    /// Sites matching the query; empty if none.
    fn find_sites(&self, query: &SiteQuery) -> Result<Vec<Site>, ApiError>;

    fn save_site(&self, site: Site) -> Result<(), ApiError>;

    /// Returns true if the site was removed.
    fn remove_site(&self, site_id: &SiteId) -> Result<bool, ApiError>;

    /// Navigation of a site, or `None` if it has none.
    ///
    /// Fails with [`ApiError::NotFound`] if the site does not exist.
    fn get_navigation(&self, site_id: &SiteId) -> Result<Option<Navigation>, ApiError>;

    /// Returns the page, or `None` if it does not exist.
    ///
    /// Fails with [`ApiError::NotFound`] if the owning site does not exist.
    fn get_page(&self, page_id: &PageId) -> Result<Option<Page>, ApiError>;

    /// Creates an unsaved page.
    ///
    /// Fails with [`ApiError::AlreadyExists`] if the page exists and with
    /// [`ApiError::NotFound`] if the owning site does not.
    fn create_page(&self, page_id: PageId) -> Result<Page, ApiError>;

    /// Pages matching the query; empty if none.
    fn find_pages(&self, query: &PageQuery) -> Result<Vec<Page>, ApiError>;

    fn save_page(&self, page: Page) -> Result<(), ApiError>;

    /// Returns true if the page was removed.
    ///
    /// Fails with [`ApiError::NotFound`] if the owning site does not exist.
    fn remove_page(&self, page_id: &PageId) -> Result<bool, ApiError>;

    /// Returns true if `user` holds the rights represented by `permission`.
    fn has_permission(&self, user: &User, permission: &Permission) -> bool;
}
