//! Per-request access snapshot.
//!
//! Loaded once per request and reused for every check in that request, so
//! repeated checks never repeat group or grant lookups.

use std::sync::Arc;

use super::catalog::{GrantTable, ResourceCatalog};
use super::engine::AuthorizationEngine;
use super::error::AuthzError;
use super::types::{Action, Capability, Decision, Principal, ResourcePermissions, ResourceRef};

/// A principal together with the permission data needed to judge it.
#[derive(Debug, Clone)]
pub struct AccessContext {
    engine: AuthorizationEngine,
    principal: Option<Principal>,
    catalog: Arc<ResourceCatalog>,
    grants: GrantTable,
}

impl AccessContext {
    /// Creates a context for an authenticated principal.
    ///
    /// `grants` only needs to cover the principal's groups.
    #[must_use]
    pub fn new(
        engine: AuthorizationEngine,
        principal: Principal,
        catalog: Arc<ResourceCatalog>,
        grants: GrantTable,
    ) -> Self {
        Self {
            engine,
            principal: Some(principal),
            catalog,
            grants,
        }
    }

    /// Creates a context with no principal; every decision is a deny.
    #[must_use]
    pub fn anonymous(engine: AuthorizationEngine, catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            engine,
            principal: None,
            catalog,
            grants: GrantTable::default(),
        }
    }

    /// The principal, if authenticated.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The resource catalog.
    #[must_use]
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// True if the principal holds the administrative role.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.principal
            .as_ref()
            .is_some_and(|p| self.engine.is_superuser(p))
    }

    /// Full decision with reason.
    pub fn decide<'a>(&'a self, action: Action, resource: impl Into<ResourceRef<'a>>) -> Decision {
        self.engine.decide(
            self.principal.as_ref(),
            action,
            resource.into(),
            &self.catalog,
            &self.grants,
        )
    }

    /// True if the action is allowed.
    pub fn is_granted<'a>(&'a self, action: Action, resource: impl Into<ResourceRef<'a>>) -> bool {
        self.decide(action, resource).is_allowed()
    }

    /// Gate helper: turns a deny into an [`AuthzError`].
    pub fn require<'a>(
        &'a self,
        action: Action,
        resource: impl Into<ResourceRef<'a>>,
    ) -> Result<(), AuthzError> {
        let resource = resource.into();
        match self.decide(action, resource) {
            Decision::Allow(_) => Ok(()),
            Decision::Deny(reason) => Err(AuthzError::from_denial(
                reason,
                action,
                &resource.to_string(),
            )),
        }
    }

    /// Read/write summary for every resource type in the catalog, sorted by code.
    #[must_use]
    pub fn permission_matrix(&self) -> Vec<ResourcePermissions> {
        let mut matrix: Vec<ResourcePermissions> = self
            .catalog
            .iter()
            .map(|resource| {
                let allowed = |capability: Capability| {
                    let action = match capability {
                        Capability::Read => Action::Read,
                        Capability::Write => Action::Write,
                    };
                    self.is_granted(action, resource)
                };
                ResourcePermissions {
                    code: resource.code.clone(),
                    name: resource.name.clone(),
                    can_read: allowed(Capability::Read),
                    can_write: allowed(Capability::Write),
                }
            })
            .collect();
        matrix.sort_by(|a, b| a.code.cmp(&b.code));
        matrix
    }
}
