//! Authorization domain types.
//!
//! Principals belong to groups; groups receive read/write grants on
//! resource types. Everything here is plain data loaded by the caller.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use atrium_shared::types::{GroupId, ResourceTypeId, UserId};

/// The action a caller wants to perform on a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// View or list.
    Read,
    /// Create or generic mutation.
    Write,
    /// Modify an existing record.
    Edit,
    /// Remove a record.
    Delete,
}

/// The grant flag an action is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Requires `can_read`.
    Read,
    /// Requires `can_write`.
    Write,
}

impl Action {
    /// All actions, in declaration order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Write, Self::Edit, Self::Delete];

    /// Edit and Delete are aliases of Write for grant lookup.
    #[must_use]
    pub const fn capability(self) -> Capability {
        match self {
            Self::Read => Capability::Read,
            Self::Write | Self::Edit | Self::Delete => Capability::Write,
        }
    }

    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    /// Parses an action, accepting voter-style attribute names (`VIEW`, `EDIT`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" => Some(Self::Read),
            "write" | "create" => Some(Self::Write),
            "edit" | "update" => Some(Self::Edit),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, coded category of protected resource ("Project", "Transaction", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Resource type ID.
    pub id: ResourceTypeId,
    /// Unique code, the preferred lookup key.
    pub code: String,
    /// Display name, the fallback lookup key.
    pub name: String,
    /// Display-only icon identifier.
    pub icon: Option<String>,
}

/// How a caller names the resource it wants to act on.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    /// An already resolved resource type.
    Type(&'a ResourceType),
    /// A code or name, resolved through the catalog.
    Named(&'a str),
}

impl<'a> From<&'a ResourceType> for ResourceRef<'a> {
    fn from(resource: &'a ResourceType) -> Self {
        Self::Type(resource)
    }
}

impl<'a> From<&'a str> for ResourceRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Named(name)
    }
}

impl fmt::Display for ResourceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(resource) => f.write_str(&resource.code),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A group the principal is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// Group ID.
    pub id: GroupId,
    /// Group name.
    pub name: String,
    /// Coarse-grained roles every member inherits.
    pub roles: BTreeSet<String>,
}

/// An authenticated user as seen by the authorization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: UserId,
    /// User email.
    pub email: String,
    /// Roles assigned directly to the user.
    pub roles: BTreeSet<String>,
    /// Groups the user belongs to.
    pub groups: Vec<GroupMembership>,
}

impl Principal {
    /// Creates a principal with no groups.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            id,
            email: email.into(),
            roles: roles.into_iter().collect(),
            groups: Vec::new(),
        }
    }

    /// Adds a group membership.
    #[must_use]
    pub fn with_group(mut self, group: GroupMembership) -> Self {
        self.groups.push(group);
        self
    }

    /// True if the user or any of its groups carries `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role) || self.groups.iter().any(|g| g.roles.contains(role))
    }

    /// Own roles merged with every group role.
    #[must_use]
    pub fn effective_roles(&self) -> BTreeSet<String> {
        let mut roles = self.roles.clone();
        for group in &self.groups {
            roles.extend(group.roles.iter().cloned());
        }
        roles
    }

    /// IDs of the principal's groups.
    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.iter().map(|g| g.id)
    }
}

/// Read/write flags a group holds on one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Group the grant belongs to.
    pub group_id: GroupId,
    /// Resource type the grant covers.
    pub resource_type_id: ResourceTypeId,
    /// Read access.
    pub can_read: bool,
    /// Write access (also covers edit and delete).
    pub can_write: bool,
}

impl PermissionGrant {
    /// True if this grant covers the capability.
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.can_read,
            Capability::Write => self.can_write,
        }
    }

    /// A grant with both flags false carries no permission and is not stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.can_read && !self.can_write
    }
}

/// Why access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllowReason {
    /// The principal holds the administrative role.
    Superuser,
    /// A group grant covered the capability.
    Group {
        /// The first group found granting access.
        group_id: GroupId,
    },
}

/// Why access was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    /// No principal on the request.
    Unauthenticated,
    /// The resource name matched no code or name in the catalog.
    UnresolvedResource {
        /// The reference that failed to resolve.
        reference: String,
    },
    /// None of the principal's groups grants the capability.
    NoGrant,
}

/// Outcome of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    /// Access permitted.
    Allow(AllowReason),
    /// Access refused.
    Deny(DenyReason),
}

impl Decision {
    /// True for `Allow`.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Read/write summary for one resource type, used to drive UI affordances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePermissions {
    /// Resource type code.
    pub code: String,
    /// Resource type name.
    pub name: String,
    /// Whether `Read` is allowed.
    pub can_read: bool,
    /// Whether `Write`/`Edit`/`Delete` are allowed.
    pub can_write: bool,
}
