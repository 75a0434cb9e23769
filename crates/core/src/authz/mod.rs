//! Group-based authorization.
//!
//! Answers "may this principal perform this action on this resource type?"
//! from group memberships and per-resource-type read/write grants.
//!
//! # Modules
//!
//! - `types` - Principals, resource types, grants, decisions
//! - `catalog` - Resource-type lookup and the grant table
//! - `engine` - The decision function
//! - `context` - Per-request snapshot used by request handlers
//! - `error` - Gate errors

pub mod catalog;
pub mod context;
pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use catalog::{GrantTable, ResourceCatalog};
pub use context::AccessContext;
pub use engine::{AuthorizationEngine, DEFAULT_ADMIN_ROLE};
pub use error::AuthzError;
pub use types::{
    Action, AllowReason, Capability, Decision, DenyReason, GroupMembership, PermissionGrant,
    Principal, ResourcePermissions, ResourceRef, ResourceType,
};
