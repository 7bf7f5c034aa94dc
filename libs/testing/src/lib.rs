//! Test support for portal API consumers.
//!
//! - [`MemoryPortal`]: a [`Portal`] kept entirely in memory
//! - [`StaticRequest`]: a [`PortalRequest`] with fixed user, site, and path
//! - [`classic_portal`]: a small populated portal fixture

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use portal_api::{
    ApiError, GroupId, Navigation, Node, NodePath, Page, PageId, PageQuery, Permission, Portal,
    PortalRequest, Site, SiteId, SiteQuery, User, UserId,
};
use portal_id::{entity, Ids, SiteType};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct State {
    sites: HashMap<SiteId, Site>,
    pages: HashMap<PageId, Page>,
    navigations: HashMap<SiteId, Navigation>,
    memberships: HashMap<UserId, Vec<(String, GroupId)>>,
}

impl State {
    fn require_site(&self, site_id: &SiteId) -> Result<(), ApiError> {
        if self.sites.contains_key(site_id) {
            Ok(())
        } else {
            Err(ApiError::not_found("site", site_id))
        }
    }

    fn has_pages(&self, site_id: &SiteId) -> bool {
        self.pages
            .keys()
            .any(|page_id| page_id.parent::<entity::Site>().as_ref() == Some(site_id))
    }
}

/// In-memory [`Portal`].
#[derive(Debug, Default)]
pub struct MemoryPortal {
    state: RwLock<State>,
}

impl MemoryPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the navigation of an existing site.
    pub fn save_navigation(&self, navigation: Navigation) -> Result<(), ApiError> {
        let mut state = self.write()?;
        state.require_site(navigation.site_id())?;
        debug!(site = %navigation.site_id(), "saving navigation");
        state
            .navigations
            .insert(navigation.site_id().clone(), navigation);
        Ok(())
    }

    /// Records that `user` holds `membership_type` in `group`.
    pub fn grant_membership(
        &self,
        user: UserId,
        membership_type: impl Into<String>,
        group: GroupId,
    ) -> Result<(), ApiError> {
        let mut state = self.write()?;
        state
            .memberships
            .entry(user)
            .or_default()
            .push((membership_type.into(), group));
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, ApiError> {
        self.state
            .read()
            .map_err(|_| ApiError::Storage("portal state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, ApiError> {
        self.state
            .write()
            .map_err(|_| ApiError::Storage("portal state lock poisoned".to_string()))
    }
}

fn site_of(page_id: &PageId) -> Result<SiteId, ApiError> {
    page_id
        .parent()
        .ok_or_else(|| ApiError::InvalidArgument(format!("'{page_id}' does not address a page")))
}

impl Portal for MemoryPortal {
    fn get_site(&self, site_id: &SiteId) -> Result<Option<Site>, ApiError> {
        Ok(self.read()?.sites.get(site_id).cloned())
    }

    fn create_site(&self, site_id: SiteId) -> Result<Site, ApiError> {
        if self.read()?.sites.contains_key(&site_id) {
            return Err(ApiError::already_exists("site", &site_id));
        }
        Ok(Site::new(site_id))
    }

    fn find_sites(&self, query: &SiteQuery) -> Result<Vec<Site>, ApiError> {
        let state = self.read()?;
        let sites = state
            .sites
            .values()
            .filter(|site| query.matches(site))
            .filter(|site| query.include_empty_sites || state.has_pages(site.id()))
            .cloned()
            .collect();
        Ok(query.finish(sites))
    }

    fn save_site(&self, site: Site) -> Result<(), ApiError> {
        debug!(site = %site.id(), "saving site");
        self.write()?.sites.insert(site.id().clone(), site);
        Ok(())
    }

    fn remove_site(&self, site_id: &SiteId) -> Result<bool, ApiError> {
        let mut state = self.write()?;
        if state.sites.remove(site_id).is_none() {
            return Ok(false);
        }
        state
            .pages
            .retain(|page_id, _| page_id.parent::<entity::Site>().as_ref() != Some(site_id));
        state.navigations.remove(site_id);
        debug!(site = %site_id, "removed site");
        Ok(true)
    }

    fn get_navigation(&self, site_id: &SiteId) -> Result<Option<Navigation>, ApiError> {
        let state = self.read()?;
        state.require_site(site_id)?;
        Ok(state.navigations.get(site_id).cloned())
    }

    fn get_page(&self, page_id: &PageId) -> Result<Option<Page>, ApiError> {
        let site_id = site_of(page_id)?;
        let state = self.read()?;
        state.require_site(&site_id)?;
        Ok(state.pages.get(page_id).cloned())
    }

    fn create_page(&self, page_id: PageId) -> Result<Page, ApiError> {
        let site_id = site_of(&page_id)?;
        let state = self.read()?;
        state.require_site(&site_id)?;
        if state.pages.contains_key(&page_id) {
            return Err(ApiError::already_exists("page", &page_id));
        }
        Ok(Page::new(page_id))
    }

    fn find_pages(&self, query: &PageQuery) -> Result<Vec<Page>, ApiError> {
        let pages = self
            .read()?
            .pages
            .values()
            .filter(|page| query.matches(page))
            .cloned()
            .collect();
        Ok(query.finish(pages))
    }

    fn save_page(&self, page: Page) -> Result<(), ApiError> {
        let site_id = site_of(page.id())?;
        let mut state = self.write()?;
        state.require_site(&site_id)?;
        debug!(page = %page.id(), "saving page");
        state.pages.insert(page.id().clone(), page);
        Ok(())
    }

    fn remove_page(&self, page_id: &PageId) -> Result<bool, ApiError> {
        let site_id = site_of(page_id)?;
        let mut state = self.write()?;
        state.require_site(&site_id)?;
        Ok(state.pages.remove(page_id).is_some())
    }

    fn has_permission(&self, user: &User, permission: &Permission) -> bool {
        let memberships = match permission {
            Permission::Everyone => return true,
            Permission::Memberships(memberships) => memberships,
        };
        let Some(user_id) = user.id() else {
            return false;
        };
        let state = match self.read() {
            Ok(state) => state,
            Err(e) => {
                warn!(user = %user_id, error = %e, "denying permission");
                return false;
            }
        };
        let Some(held) = state.memberships.get(user_id) else {
            return false;
        };

        memberships.iter().any(|required| {
            held.iter()
                .any(|(membership_type, group)| required.accepts(membership_type, group))
        })
    }
}

/// A [`PortalRequest`] with fixed values.
pub struct StaticRequest {
    user: User,
    site_id: SiteId,
    node_path: NodePath,
    locale: String,
    portal: Arc<dyn Portal>,
}

impl StaticRequest {
    /// Anonymous request for the root path of `site_id`, locale `en`.
    pub fn new(portal: Arc<dyn Portal>, site_id: SiteId) -> Self {
        Self {
            user: User::anonymous(),
            site_id,
            node_path: NodePath::root(),
            locale: "en".to_string(),
            portal,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_node_path(mut self, node_path: NodePath) -> Self {
        self.node_path = node_path;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

impl PortalRequest for StaticRequest {
    fn user(&self) -> &User {
        &self.user
    }

    fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    fn node_path(&self) -> &NodePath {
        &self.node_path
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn portal(&self) -> &dyn Portal {
        self.portal.as_ref()
    }
}

/// Populates a portal with the `classic` site:
///
/// - pages `home` (public) and `admin` (members of `platform/administrators`)
/// - navigation `/home`, `/admin`, `/admin/users`
/// - user `root` as `manager` of `platform/administrators`
pub fn classic_portal(ids: &Ids) -> Result<MemoryPortal, ApiError> {
    let portal = MemoryPortal::new();
    let site_id = ids.site_id(SiteType::Site, "classic")?;
    let admins = ids.group_id("platform", ["administrators"])?;

    let mut site = portal.create_site(site_id.clone())?;
    site.title = Some("Classic".to_string());
    portal.save_site(site)?;

    let home_id = ids.page_id(&site_id, "home")?;
    let mut home = portal.create_page(home_id.clone())?;
    home.title = Some("Home".to_string());
    portal.save_page(home)?;

    let admin_id = ids.page_id(&site_id, "admin")?;
    let mut admin = portal.create_page(admin_id.clone())?;
    admin.title = Some("Administration".to_string());
    admin.access_permission = Permission::any_membership(admins.clone());
    portal.save_page(admin)?;

    portal.save_navigation(
        Navigation::new(site_id, 1)
            .with_node(Node::new("home").with_label("Home").with_page(home_id))
            .with_node(
                Node::new("admin")
                    .with_label("Administration")
                    .with_page(admin_id)
                    .with_child(Node::new("users").with_label("Users")),
            ),
    )?;

    portal.grant_membership(ids.user_id("root")?, "manager", admins)?;
    Ok(portal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_portal_fixture() {
        let ids = Ids::new().unwrap();
        let portal = classic_portal(&ids).unwrap();
        let site_id = ids.site_id(SiteType::Site, "classic").unwrap();

        let site = portal.get_site(&site_id).unwrap().unwrap();
        assert_eq!(site.display_name(), "Classic");

        let navigation = portal.get_navigation(&site_id).unwrap().unwrap();
        assert_eq!(navigation.nodes().len(), 2);

        let pages = portal.find_pages(&PageQuery::new()).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_navigation_requires_site() {
        let ids = Ids::new().unwrap();
        let portal = MemoryPortal::new();
        let site_id = ids.site_id(SiteType::Site, "missing").unwrap();

        let err = portal.save_navigation(Navigation::new(site_id, 0)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_site_id_is_not_a_page_id() {
        let ids = Ids::new().unwrap();
        let portal = classic_portal(&ids).unwrap();
        let site_only: PageId = ids.site().parse("site:classic").unwrap();

        let err = portal.get_page(&site_only).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn test_poisoned_state_denies_permission() {
        let ids = Ids::new().unwrap();
        let portal = Arc::new(classic_portal(&ids).unwrap());
        let root = User::new(ids.user_id("root").unwrap());
        let admins = Permission::any_membership(ids.group_id("platform", ["administrators"]).unwrap());
        assert!(portal.has_permission(&root, &admins));

        let poisoner = Arc::clone(&portal);
        let _ = std::thread::spawn(move || {
            let _state = poisoner.state.write().unwrap();
            panic!("poison the portal state");
        })
        .join();

        assert!(!portal.has_permission(&root, &admins));
        assert!(portal.has_permission(&root, &Permission::everyone()));
        let site_id = ids.site_id(SiteType::Site, "classic").unwrap();
        assert!(matches!(portal.get_site(&site_id), Err(ApiError::Storage(_))));
    }

    #[test]
    fn test_static_request_defaults() {
        let ids = Ids::new().unwrap();
        let portal: Arc<dyn Portal> = Arc::new(MemoryPortal::new());
        let site_id = ids.site_id(SiteType::Site, "classic").unwrap();

        let request = StaticRequest::new(portal, site_id.clone())
            .with_locale("fr")
            .with_node_path("/home".parse().unwrap());
        assert!(request.user().is_anonymous());
        assert_eq!(request.site_id(), &site_id);
        assert_eq!(request.locale(), "fr");
        assert_eq!(request.node_path().to_string(), "/home");
    }
}
