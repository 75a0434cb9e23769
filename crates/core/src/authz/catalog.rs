//! Resource-type catalog and group grant table.

use std::collections::HashMap;

use atrium_shared::types::{GroupId, ResourceTypeId};

use super::types::{Capability, PermissionGrant, ResourceRef, ResourceType};

/// All known resource types, searchable by code and by name.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    types: Vec<ResourceType>,
}

impl ResourceCatalog {
    /// Creates a catalog from a list of resource types.
    #[must_use]
    pub fn new(types: Vec<ResourceType>) -> Self {
        Self { types }
    }

    /// Adds a resource type, replacing any entry with the same ID.
    pub fn insert(&mut self, resource: ResourceType) {
        self.types.retain(|t| t.id != resource.id);
        self.types.push(resource);
    }

    /// Exact code match.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&ResourceType> {
        self.types.iter().find(|t| t.code == code)
    }

    /// Exact name match.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ResourceType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Resolves a string reference: code first, then name.
    #[must_use]
    pub fn lookup(&self, reference: &str) -> Option<&ResourceType> {
        self.by_code(reference).or_else(|| self.by_name(reference))
    }

    /// Resolves a [`ResourceRef`]. Typed references resolve to themselves.
    #[must_use]
    pub fn resolve<'a>(&'a self, resource: ResourceRef<'a>) -> Option<&'a ResourceType> {
        match resource {
            ResourceRef::Type(resource) => Some(resource),
            ResourceRef::Named(reference) => self.lookup(reference),
        }
    }

    /// Iterates over all resource types.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.iter()
    }

    /// Number of resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Grants keyed by `(group, resource type)`; at most one per pair.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: HashMap<(GroupId, ResourceTypeId), PermissionGrant>,
}

impl GrantTable {
    /// Builds a table, later duplicates replacing earlier ones.
    #[must_use]
    pub fn new(grants: impl IntoIterator<Item = PermissionGrant>) -> Self {
        let mut table = Self::default();
        for grant in grants {
            table.insert(grant);
        }
        table
    }

    /// Inserts or replaces the grant for its pair. Empty grants remove the pair.
    pub fn insert(&mut self, grant: PermissionGrant) {
        let key = (grant.group_id, grant.resource_type_id);
        if grant.is_empty() {
            self.grants.remove(&key);
        } else {
            self.grants.insert(key, grant);
        }
    }

    /// Looks up the grant for a pair.
    #[must_use]
    pub fn get(&self, group_id: GroupId, resource_type_id: ResourceTypeId) -> Option<&PermissionGrant> {
        self.grants.get(&(group_id, resource_type_id))
    }

    /// First group among `groups` whose grant covers `capability`.
    pub fn granting_group(
        &self,
        groups: impl IntoIterator<Item = GroupId>,
        resource_type_id: ResourceTypeId,
        capability: Capability,
    ) -> Option<GroupId> {
        groups.into_iter().find(|group_id| {
            self.get(*group_id, resource_type_id)
                .is_some_and(|grant| grant.allows(capability))
        })
    }

    /// Number of stored grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// True when no grants are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
