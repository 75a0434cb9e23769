//! Permission repository: resource types, grants and per-request access
//! snapshots.

use std::sync::Arc;

use atrium_core::authz::{
    AccessContext, AuthorizationEngine, GrantTable, GroupMembership, PermissionGrant, Principal,
    ResourceCatalog, ResourceType,
};
use atrium_shared::types::{GroupId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, sea_query::OnConflict,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::catalog_cache::CatalogCache;
use crate::entities::{groups, permission_grants, resource_types, users};

/// Error types for permission administration.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    /// Resource type not found.
    #[error("Resource type not found: {0}")]
    ResourceTypeNotFound(String),

    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    /// Code or name collides with an existing resource type.
    #[error("Resource type '{0}' already exists")]
    DuplicateResourceType(String),

    /// Invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PermissionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ResourceTypeNotFound(_) | Self::GroupNotFound(_) => 404,
            Self::DuplicateResourceType(_) => 409,
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ResourceTypeNotFound(_) => "RESOURCE_TYPE_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::DuplicateResourceType(_) => "RESOURCE_TYPE_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a resource type.
#[derive(Debug, Clone)]
pub struct CreateResourceTypeInput {
    /// Unique code, e.g. `Project`.
    pub code: String,
    /// Unique display name.
    pub name: String,
    /// Optional icon identifier.
    pub icon: Option<String>,
}

/// Permission repository.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    db: DatabaseConnection,
    engine: AuthorizationEngine,
    cache: CatalogCache,
}

impl PermissionRepository {
    /// Creates a new permission repository.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        engine: AuthorizationEngine,
        cache: CatalogCache,
    ) -> Self {
        Self { db, engine, cache }
    }

    /// The authorization engine contexts are built with.
    #[must_use]
    pub const fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    // ========================================================================
    // Resource types
    // ========================================================================

    /// The resource-type catalog, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn catalog(&self) -> Result<Arc<ResourceCatalog>, PermissionError> {
        if let Some(catalog) = self.cache.get() {
            return Ok(catalog);
        }

        let types = resource_types::Entity::find()
            .order_by_asc(resource_types::Column::Code)
            .all(&self.db)
            .await?;
        let catalog = Arc::new(ResourceCatalog::new(
            types.into_iter().map(ResourceType::from).collect(),
        ));

        debug!(resource_types = catalog.len(), "Loaded resource catalog");
        self.cache.put(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Lists resource types ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_resource_types(&self) -> Result<Vec<ResourceType>, PermissionError> {
        Ok(self.catalog().await?.iter().cloned().collect())
    }

    /// Finds a resource type by code, falling back to name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_resource_type(
        &self,
        reference: &str,
    ) -> Result<Option<ResourceType>, PermissionError> {
        Ok(self.catalog().await?.lookup(reference).cloned())
    }

    /// Creates a resource type and invalidates the cached catalog.
    ///
    /// Neither the code nor the name may match the code or name of an
    /// existing resource type, so lookups stay unambiguous.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank code/name or whitespace in the code,
    /// `DuplicateResourceType` on collision.
    pub async fn create_resource_type(
        &self,
        input: CreateResourceTypeInput,
    ) -> Result<ResourceType, PermissionError> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() || code.chars().any(char::is_whitespace) {
            return Err(PermissionError::Validation(
                "code must be non-empty and contain no whitespace".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(PermissionError::Validation(
                "name must not be empty".to_string(),
            ));
        }

        let clash = resource_types::Entity::find()
            .filter(
                Condition::any()
                    .add(resource_types::Column::Code.is_in([code.as_str(), name.as_str()]))
                    .add(resource_types::Column::Name.is_in([code.as_str(), name.as_str()])),
            )
            .one(&self.db)
            .await?;
        if clash.is_some() {
            return Err(PermissionError::DuplicateResourceType(code));
        }

        let now = chrono::Utc::now().into();
        let model = resource_types::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            name: Set(name),
            icon: Set(input.icon),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        self.cache.invalidate();
        info!(resource_type = %model.code, "Created resource type");
        Ok(model.into())
    }

    // ========================================================================
    // Grants
    // ========================================================================

    /// Sets a group's flags on a resource type.
    ///
    /// Upserts the single grant for the pair. When both flags are false the
    /// grant is removed and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` / `ResourceTypeNotFound` for unknown IDs.
    pub async fn set_grant(
        &self,
        group_id: Uuid,
        resource_type_id: Uuid,
        can_read: bool,
        can_write: bool,
    ) -> Result<Option<PermissionGrant>, PermissionError> {
        groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(PermissionError::GroupNotFound(group_id))?;
        resource_types::Entity::find_by_id(resource_type_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| PermissionError::ResourceTypeNotFound(resource_type_id.to_string()))?;

        if !(can_read || can_write) {
            permission_grants::Entity::delete_many()
                .filter(permission_grants::Column::GroupId.eq(group_id))
                .filter(permission_grants::Column::ResourceTypeId.eq(resource_type_id))
                .exec(&self.db)
                .await?;
            info!(%group_id, %resource_type_id, "Removed permission grant");
            return Ok(None);
        }

        // Single statement so concurrent writers converge on one row.
        let now = chrono::Utc::now().into();
        let saved = permission_grants::Entity::insert(permission_grants::ActiveModel {
            id: Set(Uuid::now_v7()),
            group_id: Set(group_id),
            resource_type_id: Set(resource_type_id),
            can_read: Set(can_read),
            can_write: Set(can_write),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                permission_grants::Column::GroupId,
                permission_grants::Column::ResourceTypeId,
            ])
            .update_columns([
                permission_grants::Column::CanRead,
                permission_grants::Column::CanWrite,
                permission_grants::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_with_returning(&self.db)
        .await?;

        info!(%group_id, %resource_type_id, can_read, can_write, "Set permission grant");
        Ok(Some(PermissionGrant::from(&saved)))
    }

    /// All grants held by a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn list_group_grants(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<PermissionGrant>, PermissionError> {
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(PermissionError::GroupNotFound(group_id))?;

        let grants = group
            .find_related(permission_grants::Entity)
            .all(&self.db)
            .await?;
        Ok(grants.iter().map(PermissionGrant::from).collect())
    }

    // ========================================================================
    // Access snapshots
    // ========================================================================

    /// A context with no principal.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub async fn anonymous_context(&self) -> Result<AccessContext, PermissionError> {
        Ok(AccessContext::anonymous(self.engine.clone(), self.catalog().await?))
    }

    /// Loads everything needed to judge `user_id` for the rest of a request.
    ///
    /// Unknown or inactive users get an anonymous context.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn load_access_context(
        &self,
        user_id: Uuid,
    ) -> Result<AccessContext, PermissionError> {
        let catalog = self.catalog().await?;

        let Some(user) = users::Entity::find_by_id(user_id).one(&self.db).await? else {
            debug!(%user_id, "Access context for unknown user");
            return Ok(AccessContext::anonymous(self.engine.clone(), catalog));
        };
        if !user.is_active {
            debug!(%user_id, "Access context for inactive user");
            return Ok(AccessContext::anonymous(self.engine.clone(), catalog));
        }

        let memberships = user.find_related(groups::Entity).all(&self.db).await?;
        let group_ids: Vec<Uuid> = memberships.iter().map(|g| g.id).collect();

        let principal = memberships.into_iter().fold(
            Principal::new(UserId::from_uuid(user.id), user.email.clone(), user.role_set()),
            |principal, group| {
                principal.with_group(GroupMembership {
                    id: GroupId::from_uuid(group.id),
                    roles: group.role_set(),
                    name: group.name,
                })
            },
        );

        let grants = if group_ids.is_empty() {
            GrantTable::default()
        } else {
            let rows = permission_grants::Entity::find()
                .filter(permission_grants::Column::GroupId.is_in(group_ids))
                .all(&self.db)
                .await?;
            GrantTable::new(rows.iter().map(PermissionGrant::from))
        };

        Ok(AccessContext::new(self.engine.clone(), principal, catalog, grants))
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
