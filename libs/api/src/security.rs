//! Users, memberships, and permissions.

use std::fmt;

use portal_id::Ids;
use serde::{Serialize, Serializer};

use crate::{ApiError, GroupId, UserId};

/// Membership type matching any membership in a group.
pub const ANY_MEMBERSHIP: &str = "*";

/// The user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct User {
    id: Option<UserId>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self { id: Some(id) }
    }

    /// The unauthenticated user.
    pub fn anonymous() -> Self {
        Self { id: None }
    }

    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }
}

/// A membership of a given type in a group, written `type:/group/path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Membership {
    membership_type: String,
    group: GroupId,
}

impl Membership {
    pub fn new(membership_type: impl Into<String>, group: GroupId) -> Self {
        Self {
            membership_type: membership_type.into(),
            group,
        }
    }

    /// Any membership type in `group`.
    pub fn any(group: GroupId) -> Self {
        Self::new(ANY_MEMBERSHIP, group)
    }

    /// Parses `type:/group/path` against the registry's group context.
    pub fn parse(ids: &Ids, s: &str) -> Result<Self, ApiError> {
        let Some((membership_type, path)) = s.split_once(':') else {
            return Err(ApiError::InvalidArgument(format!(
                "membership '{s}' is missing ':' separator"
            )));
        };
        if membership_type.is_empty() {
            return Err(ApiError::InvalidArgument(format!(
                "membership '{s}' has an empty type"
            )));
        }

        let path = path.strip_prefix('/').unwrap_or(path);
        let group = ids.group().parse(path)?;
        Ok(Self::new(membership_type, group))
    }

    pub fn membership_type(&self) -> &str {
        &self.membership_type
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    /// Returns true if holding `membership_type` in `group` satisfies this
    /// membership.
    pub fn accepts(&self, membership_type: &str, group: &GroupId) -> bool {
        &self.group == group
            && (self.membership_type == ANY_MEMBERSHIP || self.membership_type == membership_type)
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.membership_type, self.group)
    }
}

impl Serialize for Membership {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Who may access or edit a site or page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Anyone, including anonymous users.
    #[default]
    Everyone,
    /// Holders of at least one of the listed memberships.
    Memberships(Vec<Membership>),
}

impl Permission {
    pub fn everyone() -> Self {
        Permission::Everyone
    }

    pub fn any_membership(group: GroupId) -> Self {
        Permission::Memberships(vec![Membership::any(group)])
    }

    pub fn is_everyone(&self) -> bool {
        matches!(self, Permission::Everyone)
    }

    pub fn memberships(&self) -> &[Membership] {
        match self {
            Permission::Everyone => &[],
            Permission::Memberships(memberships) => memberships,
        }
    }

    /// Parses a list of `type:/group/path` entries; `Everyone` is accepted alone.
    pub fn parse<'a, I>(ids: &Ids, entries: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entries: Vec<&str> = entries.into_iter().collect();
        if entries == ["Everyone"] {
            return Ok(Permission::Everyone);
        }
        let memberships = entries
            .into_iter()
            .map(|entry| Membership::parse(ids, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Permission::Memberships(memberships))
    }
}
