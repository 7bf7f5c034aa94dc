//! Well-known contexts and typed ID constructors.
//!
//! [`Ids`] is the read-only table of addressing schemes used across the
//! portal. It is constructed once (optionally extended with configured
//! definitions) and passed by reference; lookups never mutate it. The only
//! mutable state is the counter that mints managed-content suffixes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::ContextDefinition;
use crate::entity::{
    Application, Content, Entity, Group, ManagedContent, Page, Portal, PortalContainer,
    PortalObject, Site, User,
};
use crate::{Context, Id, IdError};

// =============================================================================
// Component Names
// =============================================================================

pub const CONTAINER_COMPONENT_NAME: &str = "containerComponent";
pub const PORTAL_COMPONENT_NAME: &str = "portalComponent";
pub const INVOKER_COMPONENT_NAME: &str = "invokerComponent";
pub const PORTLET_COMPONENT_NAME: &str = "portletComponent";
pub const INSTANCE_COMPONENT_NAME: &str = "instanceComponent";

pub const USER_COMPONENT_NAME: &str = "userName";
pub const GROUP_COMPONENT_NAME: &str = "root";
pub const SITE_TYPE_COMPONENT_NAME: &str = "siteType";
pub const SITE_NAME_COMPONENT_NAME: &str = "siteName";
pub const PAGE_COMPONENT_NAME: &str = "pageName";

// =============================================================================
// Site Types
// =============================================================================

/// Kind of site a site ID addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    /// A portal site.
    Site,
    /// A group space.
    Space,
    /// A user dashboard.
    Dashboard,
}

impl SiteType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SiteType::Site => "site",
            SiteType::Space => "space",
            SiteType::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site" => Ok(SiteType::Site),
            "space" => Ok(SiteType::Space),
            "dashboard" => Ok(SiteType::Dashboard),
            other => Err(IdError::PatternMismatch {
                context: "site".to_string(),
                component: SITE_TYPE_COMPONENT_NAME.to_string(),
                pattern: "site|space|dashboard".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Registry of well-known contexts, plus any configured ones.
#[derive(Debug)]
pub struct Ids {
    portlet: Arc<Context>,
    user: Arc<Context>,
    group: Arc<Context>,
    container: Arc<Context>,
    application: Arc<Context>,
    wsrp: Arc<Context>,
    content: Arc<Context>,
    site: Arc<Context>,
    by_name: BTreeMap<String, Arc<Context>>,
    managed_content_counter: AtomicU64,
}

impl Ids {
    /// Builds the well-known contexts.
    pub fn new() -> Result<Self, IdError> {
        Self::with_definitions(Vec::new())
    }

    /// Builds the well-known contexts plus the given definitions.
    ///
    /// A definition reusing a registered name is a configuration error.
    pub fn with_definitions<I>(definitions: I) -> Result<Self, IdError>
    where
        I: IntoIterator<Item = ContextDefinition>,
    {
        let portlet = Context::builder("portlet")
            .with_default_separator("=")
            .required_component::<PortalContainer>(CONTAINER_COMPONENT_NAME, "container")
            .required_component::<Portal>(PORTAL_COMPONENT_NAME, "portal")
            .optional_component::<PortalObject>(INVOKER_COMPONENT_NAME, ".*")
            .optional_component::<PortalObject>(PORTLET_COMPONENT_NAME, ".*")
            .optional_component::<PortalObject>(INSTANCE_COMPONENT_NAME, ".*Instance$")
            .ignore_remaining_after_first_missing_optional()
            .build()?;

        let user = Context::builder("userName")
            .required_component::<User>(USER_COMPONENT_NAME, ".*")
            .build()?;

        let group = Context::builder("group")
            .with_default_separator("/")
            .required_unbounded_hierarchical_component::<Group>(GROUP_COMPONENT_NAME, ".*")
            .build()?;

        let container = Context::builder("PortalContainer")
            .with_default_separator("#")
            .required_component::<PortalContainer>("container", "[a-z0-9]*")
            .build()?;

        let application = Context::builder("application")
            .with_default_separator("/")
            .required_component::<Application>("applicationName", ".*")
            .required_component::<PortalObject>("portletName", ".*")
            .build()?;

        let wsrp = Context::builder("wsrp")
            .with_default_separator(".")
            .required_component::<PortalObject>("invokerId", ".*")
            .required_component::<PortalObject>("portletId", ".*")
            .build()?;

        let content = Context::builder("ManagedContent")
            .required_component::<Content>("content", ".*")
            .optional_component::<ManagedContent<Content>>("managedContent", "[a-z0-9]*")
            .with_default_separator("_m:")
            .build()?;

        let site = Context::builder("site")
            .with_default_separator(":")
            .required_component::<Site>(SITE_TYPE_COMPONENT_NAME, "site|space|dashboard")
            .required_component::<Site>(SITE_NAME_COMPONENT_NAME, ".+")
            .optional_component::<Page>(PAGE_COMPONENT_NAME, ".+")
            .build()?;

        let mut by_name = BTreeMap::new();
        for context in [
            &portlet,
            &user,
            &group,
            &container,
            &application,
            &wsrp,
            &content,
            &site,
        ] {
            by_name.insert(context.name().to_string(), Arc::clone(context));
        }

        for definition in definitions {
            if by_name.contains_key(&definition.name) {
                return Err(IdError::DuplicateContext {
                    context: definition.name,
                });
            }
            let context = definition.build()?;
            debug!(context = %context.name(), "registered configured context");
            by_name.insert(context.name().to_string(), context);
        }

        Ok(Self {
            portlet,
            user,
            group,
            container,
            application,
            wsrp,
            content,
            site,
            by_name,
            managed_content_counter: AtomicU64::new(0),
        })
    }

    pub fn portlet(&self) -> &Arc<Context> {
        &self.portlet
    }

    pub fn user(&self) -> &Arc<Context> {
        &self.user
    }

    pub fn group(&self) -> &Arc<Context> {
        &self.group
    }

    pub fn container(&self) -> &Arc<Context> {
        &self.container
    }

    pub fn application(&self) -> &Arc<Context> {
        &self.application
    }

    pub fn wsrp(&self) -> &Arc<Context> {
        &self.wsrp
    }

    pub fn content(&self) -> &Arc<Context> {
        &self.content
    }

    pub fn site(&self) -> &Arc<Context> {
        &self.site
    }

    /// Looks up a context by scheme name.
    pub fn context(&self, name: &str) -> Option<&Arc<Context>> {
        self.by_name.get(name)
    }

    /// Looks up a context by scheme name, failing for unknown names.
    pub fn require(&self, name: &str) -> Result<&Arc<Context>, IdError> {
        self.context(name)
            .ok_or_else(|| IdError::UnknownContext(name.to_string()))
    }

    /// All registered contexts, ordered by name.
    pub fn contexts(&self) -> impl Iterator<Item = &Arc<Context>> {
        self.by_name.values()
    }

    /// Parses a candidate against the named context.
    pub fn parse_in<T: Entity>(&self, name: &str, candidate: &str) -> Result<Id<T>, IdError> {
        self.require(name)?.parse(candidate)
    }

    // -------------------------------------------------------------------------
    // Typed constructors
    // -------------------------------------------------------------------------

    pub fn user_id(&self, user_name: &str) -> Result<Id<User>, IdError> {
        self.user.create([user_name])
    }

    /// Group ID from a root group and its descendants, e.g.
    /// `group_id("platform", ["administrators"])` → `platform/administrators`.
    pub fn group_id<I, S>(&self, root: &str, children: I) -> Result<Id<Group>, IdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = std::iter::once(root.to_string()).chain(children.into_iter().map(Into::into));
        self.group.create(values)
    }

    pub fn container_id(&self, container_name: &str) -> Result<Id<PortalContainer>, IdError> {
        self.container.create([container_name])
    }

    /// Portal ID in the portlet addressing scheme.
    pub fn portal_id(&self, container_name: &str, portal_name: &str) -> Result<Id<Portal>, IdError> {
        self.portlet.create([container_name, portal_name])
    }

    pub fn application_id(
        &self,
        application_name: &str,
        portlet_name: &str,
    ) -> Result<Id<Application>, IdError> {
        self.application.create([application_name, portlet_name])
    }

    pub fn wsrp_portlet_id(&self, invoker: &str, portlet: &str) -> Result<Id<Content>, IdError> {
        self.wsrp.create([invoker, portlet])
    }

    pub fn content_id(&self, content: &str) -> Result<Id<Content>, IdError> {
        self.content.create([content])
    }

    /// Mints a new managed-content ID below `content_id`.
    ///
    /// Each call takes the next value of the registry counter as suffix, so
    /// repeated calls yield distinct IDs.
    pub fn managed_content_id<T: Entity>(
        &self,
        content_id: &Id<T>,
    ) -> Result<Id<ManagedContent<T>>, IdError> {
        let suffix = self.managed_content_counter.fetch_add(1, Ordering::Relaxed);
        content_id.child(suffix.to_string())
    }

    pub fn site_id(&self, site_type: SiteType, site_name: &str) -> Result<Id<Site>, IdError> {
        self.site.create([site_type.as_str(), site_name])
    }

    /// Page ID below a site ID.
    pub fn page_id(&self, site_id: &Id<Site>, page_name: &str) -> Result<Id<Page>, IdError> {
        site_id.child(page_name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::context::Cardinality;
    use crate::definition::ComponentDefinition;
    use crate::entity::EntityKind;

    fn ids() -> Ids {
        Ids::new().unwrap()
    }

    #[test]
    fn test_portlet_rejects_bad_container() {
        let ids = ids();
        let err = ids
            .portlet()
            .create::<Portal, _, _>(["Container!", "portal"])
            .unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.component(), Some(CONTAINER_COMPONENT_NAME));
    }

    #[test]
    fn test_container_id_pattern() {
        let ids = ids();
        assert!(ids.container_id("UPPER").unwrap_err().is_validation_error());
        assert_eq!(ids.container_id("portal1").unwrap().to_string(), "portal1");
    }

    #[test]
    fn test_portlet_truncates_after_missing_optional() {
        let ids = ids();
        let id: Id<Portal> = ids.portlet().parse("container=portal").unwrap();
        assert_eq!(id.depth(), 2);
        assert_eq!(id.component(CONTAINER_COMPONENT_NAME), Some("container"));
        assert_eq!(id.component(PORTAL_COMPONENT_NAME), Some("portal"));
        assert_eq!(id.component(INVOKER_COMPONENT_NAME), None);
        assert_eq!(id, ids.portal_id("container", "portal").unwrap());
    }

    #[test]
    fn test_portlet_full_and_unmatched_instance() {
        let ids = ids();
        let full: Id<PortalObject> = ids
            .portlet()
            .parse("container=portal=local=Hello=helloInstance")
            .unwrap();
        assert_eq!(full.depth(), 5);
        assert_eq!(full.component(INSTANCE_COMPONENT_NAME), Some("helloInstance"));

        // The instance slot does not match, truncation drops it and the rest.
        let partial: Id<PortalObject> = ids
            .portlet()
            .parse("container=portal=local=Hello=other")
            .unwrap();
        assert_eq!(partial.depth(), 4);
        assert_eq!(partial.to_string(), "container=portal=local=Hello");
    }

    #[test]
    fn test_all_matching_optional_is_never_missing() {
        let ids = ids();
        let id: Id<PortalObject> = ids.portlet().parse("container=portal=").unwrap();
        assert_eq!(id.component(INVOKER_COMPONENT_NAME), Some(""));
        assert_eq!(id.to_string(), "container=portal=");
    }

    #[test]
    fn test_group_ids() {
        let ids = ids();
        let admins = ids.group_id("platform", ["administrators"]).unwrap();
        assert_eq!(admins.to_string(), "platform/administrators");

        let board: Id<Group> = ids
            .group()
            .parse("platform/administrators/executive-board")
            .unwrap();
        assert_eq!(board.depth(), 3);
        let children: Vec<_> = board.values().skip(1).collect();
        assert_eq!(children, vec!["administrators", "executive-board"]);
        assert_eq!(board.parent::<Group>(), Some(admins));
    }

    #[test]
    fn test_managed_content_ids_are_unique() {
        let ids = ids();
        let content = ids.content_id("somecontent").unwrap();
        let first = ids.managed_content_id(&content).unwrap();
        let second = ids.managed_content_id(&content).unwrap();
        assert_eq!(first.to_string(), "somecontent_m:0");
        assert_eq!(second.to_string(), "somecontent_m:1");
        assert_ne!(first, second);
    }

    #[test]
    fn test_managed_content_counter_is_shared_across_threads() {
        let ids = Arc::new(ids());
        let content = ids.content_id("c").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                let content = content.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| ids.managed_content_id(&content).unwrap().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let minted: HashSet<String> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        assert_eq!(minted.len(), 100);
    }

    #[test]
    fn test_same_string_in_different_contexts() {
        let ids = ids();
        let app = ids.application_id("app", "portlet").unwrap();
        let group: Id<Application> = ids.group().parse("app/portlet").unwrap();
        assert_eq!(app.to_string(), group.to_string());
        assert_ne!(app, group);
    }

    #[test]
    fn test_wsrp_and_application_ids() {
        let ids = ids();
        let wsrp = ids.wsrp_portlet_id("selfv2", "portlet").unwrap();
        assert_eq!(wsrp.to_string(), "selfv2.portlet");
        assert_eq!(ids.wsrp().parse::<Content>("selfv2.portlet").unwrap(), wsrp);

        let app = ids.application_id("web", "HelloPortlet").unwrap();
        assert_eq!(app.to_string(), "web/HelloPortlet");
        assert_eq!(app.owner(), Some(EntityKind::PortalObject));
    }

    #[test]
    fn test_user_id() {
        let ids = ids();
        let root = ids.user_id("root").unwrap();
        assert_eq!(root.to_string(), "root");
        assert_eq!(ids.parse_in::<User>("userName", "root").unwrap(), root);
    }

    #[test]
    fn test_site_and_page_ids() {
        let ids = ids();
        let site = ids.site_id(SiteType::Site, "classic").unwrap();
        assert_eq!(site.to_string(), "site:classic");

        let page = ids.page_id(&site, "home").unwrap();
        assert_eq!(page.to_string(), "site:classic:home");
        assert_eq!(page.parent::<Site>(), Some(site));

        let space = ids.site_id(SiteType::Space, "/platform/users").unwrap();
        assert_eq!(ids.site().parse::<Site>("space:/platform/users").unwrap(), space);

        assert!(ids.site_id(SiteType::Site, "bad:name").is_err());
        assert!("portal".parse::<SiteType>().is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        let ids = ids();
        let names: Vec<_> = ids.contexts().map(|c| c.name().to_string()).collect();
        for expected in [
            "portlet",
            "userName",
            "group",
            "PortalContainer",
            "application",
            "wsrp",
            "ManagedContent",
            "site",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }

        assert!(Arc::ptr_eq(ids.require("group").unwrap(), ids.group()));
        let err = ids.parse_in::<Group>("nope", "x").unwrap_err();
        assert!(matches!(err, IdError::UnknownContext(_)));
    }

    #[test]
    fn test_with_definitions() {
        let definition = ContextDefinition {
            name: "tenant".to_string(),
            default_separator: "/".to_string(),
            truncate_on_missing_optional: false,
            components: vec![ComponentDefinition {
                name: "org".to_string(),
                owner: EntityKind::Group,
                pattern: "[a-z]+".to_string(),
                cardinality: Cardinality::Required,
                separator: None,
            }],
        };

        let ids = Ids::with_definitions([definition.clone()]).unwrap();
        let id: Id<Group> = ids.parse_in("tenant", "acme").unwrap();
        assert_eq!(id.to_string(), "acme");

        let clash = ContextDefinition {
            name: "group".to_string(),
            ..definition
        };
        let err = Ids::with_definitions([clash]).unwrap_err();
        assert!(matches!(err, IdError::DuplicateContext { .. }));
    }

    mod roundtrip {
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        use super::*;

        /// Whenever `create` accepts the values, parsing the display form
        /// gives the same ID back.
        fn check_roundtrip(context: &Arc<Context>, values: Vec<String>) -> Result<(), TestCaseError> {
            let Ok(id) = context.create::<PortalObject, _, _>(values) else {
                return Ok(());
            };
            let parsed: Id<PortalObject> = context
                .parse(&id.to_string())
                .map_err(|e| TestCaseError::fail(format!("'{id}' does not parse: {e}")))?;
            prop_assert_eq!(parsed, id);
            Ok(())
        }

        proptest! {
            #[test]
            fn prop_generated_context_roundtrip(
                separator in "[:ab-]{1,3}",
                width in 1usize..4,
                repeatable in any::<bool>(),
                values in proptest::collection::vec("[:ab-]{0,4}", 3..7),
            ) {
                let mut builder = Context::builder("generated").with_default_separator(separator);
                for slot in 0..width {
                    let cardinality = if repeatable && slot + 1 == width {
                        Cardinality::Repeatable
                    } else {
                        Cardinality::Required
                    };
                    builder = builder.component(format!("c{slot}"), EntityKind::PortalObject, ".*", cardinality);
                }
                let context = builder.build().unwrap();

                let values = if repeatable { values } else { values.into_iter().take(width).collect() };
                check_roundtrip(&context, values)?;
            }

            #[test]
            fn prop_two_part_contexts_roundtrip(
                first in "[a-z./#:=]{0,6}",
                second in "[a-z./#:=]{0,6}",
            ) {
                let ids = Ids::new().unwrap();
                for context in [ids.application(), ids.wsrp()] {
                    check_roundtrip(context, vec![first.clone(), second.clone()])?;
                }
            }

            #[test]
            fn prop_single_part_contexts_roundtrip(value in "[a-z0-9./#:=]{0,8}") {
                let ids = Ids::new().unwrap();
                for context in [ids.user(), ids.container()] {
                    check_roundtrip(context, vec![value.clone()])?;
                }
            }

            #[test]
            fn prop_site_roundtrip(
                site_type in prop::sample::select(vec!["site", "space", "dashboard"]),
                site_name in "[a-z:]{1,6}",
                page in proptest::option::of("[a-z:]{1,6}"),
            ) {
                let ids = Ids::new().unwrap();
                let values: Vec<String> = [site_type.to_string(), site_name]
                    .into_iter()
                    .chain(page)
                    .collect();
                check_roundtrip(ids.site(), values)?;
            }

            #[test]
            fn prop_group_roundtrip(segments in proptest::collection::vec("[a-z0-9-]{0,12}", 1..6)) {
                let ids = Ids::new().unwrap();
                let id: Id<Group> = ids.group().create(segments).unwrap();
                let parsed: Id<Group> = ids.group().parse(&id.to_string()).unwrap();
                prop_assert_eq!(&parsed, &id);

                let again: Id<Group> = ids.group().parse(&parsed.to_string()).unwrap();
                prop_assert_eq!(again, parsed);
            }

            #[test]
            fn prop_portlet_roundtrip(
                invoker in "[a-zA-Z0-9.]{0,8}",
                portlet in "[a-zA-Z0-9]{0,8}",
                instance in "[a-z]{0,8}",
                depth in 0usize..=3,
            ) {
                let ids = Ids::new().unwrap();
                let values = vec![
                    "container".to_string(),
                    "portal".to_string(),
                    invoker,
                    portlet,
                    format!("{instance}Instance"),
                ];
                let id: Id<PortalObject> = ids.portlet().create(values.into_iter().take(2 + depth)).unwrap();
                let parsed: Id<PortalObject> = ids.portlet().parse(&id.to_string()).unwrap();
                prop_assert_eq!(parsed, id);
            }

            #[test]
            fn prop_content_roundtrip(
                content in "[a-zA-Z0-9 .-]{0,12}",
                managed in proptest::option::of("[a-z0-9]{0,4}"),
            ) {
                let ids = Ids::new().unwrap();
                let values: Vec<String> = std::iter::once(content).chain(managed).collect();
                let id: Id<Content> = ids.content().create(values).unwrap();
                let parsed: Id<Content> = ids.content().parse(&id.to_string()).unwrap();
                prop_assert_eq!(parsed, id);
            }
        }
    }
}
