//! Per-request authorization.
//!
//! [`Access`] loads the caller's [`AccessContext`] once when a handler asks
//! for it. Every gate in that handler then reuses the same snapshot.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use uuid::Uuid;

use atrium_core::authz::{AccessContext, Action, AuthzError, ResourceRef};
use atrium_shared::Claims;

use crate::AppState;
use crate::error::error_response;

/// Resource type codes the API gates on.
pub mod resources {
    /// Sales transactions.
    pub const TRANSACTION: &str = "Transaction";
    /// User groups and memberships.
    pub const GROUP: &str = "Group";
    /// The resource-type catalog itself.
    pub const RESOURCE_TYPE: &str = "ResourceType";
    /// Group read/write grants.
    pub const PERMISSION_GRANT: &str = "PermissionGrant";
}

/// The authenticated caller together with their permission snapshot.
#[derive(Debug, Clone)]
pub struct Access {
    claims: Claims,
    context: AccessContext,
}

impl Access {
    /// The caller's user ID.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.claims.user_id()
    }

    /// The loaded permission snapshot.
    #[must_use]
    pub fn context(&self) -> &AccessContext {
        &self.context
    }

    /// Gate: `Ok` if the caller may perform `action` on `resource`, otherwise
    /// the 401/403 response to return.
    pub fn require<'a>(
        &'a self,
        action: Action,
        resource: impl Into<ResourceRef<'a>>,
    ) -> Result<(), Response> {
        self.context
            .require(action, resource)
            .map_err(|e| error_response(&e))
    }
}

impl FromRequestParts<AppState> for Access {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| error_response(&AuthzError::Unauthenticated))?;

        let context = state
            .permissions
            .load_access_context(claims.user_id())
            .await
            .map_err(|e| error_response(&e))?;

        // A valid token for a user that was deactivated or removed since.
        if context.principal().is_none() {
            return Err(error_response(&AuthzError::Unauthenticated));
        }

        Ok(Self { claims, context })
    }
}
