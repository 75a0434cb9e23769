//! The authorization decision function.

use tracing::{debug, warn};

use super::catalog::{GrantTable, ResourceCatalog};
use super::types::{Action, AllowReason, Decision, DenyReason, Principal, ResourceRef};

/// Default administrative role.
pub const DEFAULT_ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Stateless decision engine.
///
/// The only configuration is which role bypasses grants.
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    admin_role: String,
}

impl Default for AuthorizationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_ROLE)
    }
}

impl AuthorizationEngine {
    /// Creates an engine with the given administrative role.
    #[must_use]
    pub fn new(admin_role: impl Into<String>) -> Self {
        Self {
            admin_role: admin_role.into(),
        }
    }

    /// The administrative role.
    #[must_use]
    pub fn admin_role(&self) -> &str {
        &self.admin_role
    }

    /// True if the principal holds the administrative role, directly or via a group.
    #[must_use]
    pub fn is_superuser(&self, principal: &Principal) -> bool {
        principal.has_role(&self.admin_role)
    }

    /// Decides whether `principal` may perform `action` on `resource`.
    ///
    /// Order: unauthenticated → deny; string reference resolved by code then
    /// name, unresolved → deny; admin role → allow; any member group granting
    /// the capability → allow; otherwise deny.
    pub fn decide(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: ResourceRef<'_>,
        catalog: &ResourceCatalog,
        grants: &GrantTable,
    ) -> Decision {
        let Some(principal) = principal else {
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        let Some(resource_type) = catalog.resolve(resource) else {
            warn!(
                resource = %resource,
                action = %action,
                "Authorization check references an unknown resource type"
            );
            return Decision::Deny(DenyReason::UnresolvedResource {
                reference: resource.to_string(),
            });
        };

        if self.is_superuser(principal) {
            return Decision::Allow(AllowReason::Superuser);
        }

        match grants.granting_group(principal.group_ids(), resource_type.id, action.capability()) {
            Some(group_id) => Decision::Allow(AllowReason::Group { group_id }),
            None => {
                debug!(
                    user_id = %principal.id,
                    resource = %resource_type.code,
                    action = %action,
                    "Access denied: no group grant"
                );
                Decision::Deny(DenyReason::NoGrant)
            }
        }
    }

    /// Boolean form of [`decide`](Self::decide).
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: ResourceRef<'_>,
        catalog: &ResourceCatalog,
        grants: &GrantTable,
    ) -> bool {
        self.decide(principal, action, resource, catalog, grants)
            .is_allowed()
    }
}
