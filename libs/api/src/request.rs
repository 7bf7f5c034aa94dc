//! The per-request facade over a [`Portal`].
//!
//! A portal server installs the request being served on the handling thread
//! with [`set_current`]; API consumers retrieve it with [`current`].

use std::cell::RefCell;
use std::sync::Arc;

use tracing::trace;

use crate::{
    ApiError, Navigation, Node, NodePath, Page, Portal, Site, SiteId, User, Visibility,
};

/// Depth of navigation returned by [`PortalRequest::navigation`].
pub const DEFAULT_NAVIGATION_DEPTH: usize = 1;

/// The portal request being served.
pub trait PortalRequest: Send + Sync {
    /// The requesting user; [`User::anonymous`] when unauthenticated.
    fn user(&self) -> &User;

    fn site_id(&self) -> &SiteId;

    fn node_path(&self) -> &NodePath;

    /// Locale tag of the request (e.g. `en`, `fr-CA`).
    fn locale(&self) -> &str;

    fn portal(&self) -> &dyn Portal;

    fn site(&self) -> Result<Option<Site>, ApiError> {
        self.portal().get_site(self.site_id())
    }

    fn save_site(&self, site: Site) -> Result<(), ApiError> {
        self.portal().save_site(site)
    }

    /// Page bound to the current node, if any.
    fn page(&self) -> Result<Option<Page>, ApiError> {
        match self.node()?.page_id() {
            Some(page_id) => self.portal().get_page(page_id),
            None => Ok(None),
        }
    }

    fn save_page(&self, page: Page) -> Result<(), ApiError> {
        self.portal().save_page(page)
    }

    /// Top-level navigation visible to the requesting user.
    fn navigation(&self) -> Result<Option<Navigation>, ApiError> {
        let user = self.user();
        let portal = self.portal();
        self.navigation_with(DEFAULT_NAVIGATION_DEPTH, &|node| {
            visible_to(user, portal, node)
        })
    }

    fn navigation_with(
        &self,
        depth: usize,
        filter: &dyn Fn(&Node) -> bool,
    ) -> Result<Option<Navigation>, ApiError> {
        let navigation = self.portal().get_navigation(self.site_id())?;
        Ok(navigation.map(|navigation| navigation.visit(depth, filter)))
    }

    /// Node addressed by the request path.
    ///
    /// Fails with [`ApiError::NotFound`] if the site has no such node.
    fn node(&self) -> Result<Node, ApiError> {
        let path = self.node_path();
        self.portal()
            .get_navigation(self.site_id())?
            .and_then(|navigation| navigation.node(path).cloned())
            .ok_or_else(|| ApiError::not_found("node", path))
    }
}

/// Returns true if `node` is displayed and its page (if any) is accessible
/// to `user`.
pub fn visible_to(user: &User, portal: &dyn Portal, node: &Node) -> bool {
    if node.visibility != Visibility::Displayed {
        return false;
    }
    let Some(page_id) = node.page_id() else {
        return true;
    };
    match portal.get_page(page_id) {
        Ok(Some(page)) => portal.has_permission(user, &page.access_permission),
        Ok(None) => true,
        Err(_) => false,
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<dyn PortalRequest>>> = const { RefCell::new(None) };
}

/// The request installed on this thread, if any.
pub fn current() -> Option<Arc<dyn PortalRequest>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Installs (or with `None`, clears) the request for this thread.
pub fn set_current(request: Option<Arc<dyn PortalRequest>>) {
    trace!(installed = request.is_some(), "setting current portal request");
    CURRENT.with(|current| *current.borrow_mut() = request);
}
