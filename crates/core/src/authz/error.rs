//! Authorization error types.
//!
//! Decisions themselves never fail; these errors describe a denial once a
//! caller has decided to gate on it, or a failure loading permission data.

use thiserror::Error;

use super::types::{Action, DenyReason};

/// Errors raised at an authorization gate.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No principal present.
    #[error("Authentication required")]
    Unauthenticated,

    /// The resource reference matched no resource type.
    #[error("Unknown resource type '{0}'")]
    UnresolvedResource(String),

    /// The principal lacks the capability.
    #[error("Not allowed to {action} {resource}")]
    Forbidden {
        /// The attempted action.
        action: Action,
        /// The resource reference as given.
        resource: String,
    },

    /// Permission data could not be loaded.
    #[error("Permission store error: {0}")]
    Store(String),
}

impl AuthzError {
    /// Builds the gate error for a deny reason.
    #[must_use]
    pub fn from_denial(reason: DenyReason, action: Action, resource: &str) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            DenyReason::UnresolvedResource { reference } => Self::UnresolvedResource(reference),
            DenyReason::NoGrant => Self::Forbidden {
                action,
                resource: resource.to_string(),
            },
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// An unresolved resource is reported as 403: the request fails closed.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::UnresolvedResource(_) | Self::Forbidden { .. } => 403,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::UnresolvedResource(_) | Self::Forbidden { .. } => "FORBIDDEN",
            Self::Store(_) => "PERMISSION_STORE_ERROR",
        }
    }
}
