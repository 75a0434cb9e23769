//! Group repository: groups and their members.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{groups, roles_to_json, user_groups, users};

/// Error types for group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    /// Group not found.
    #[error("Group not found: {0}")]
    NotFound(Uuid),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// A group with this name already exists.
    #[error("Group name '{0}' is already taken")]
    NameTaken(String),

    /// Name is blank.
    #[error("Group name must not be empty")]
    EmptyName,

    /// Setting a group's roles, or changing who inherits them, is reserved
    /// to superusers.
    #[error("Only administrators may assign roles through group '{0}'")]
    RoleAssignmentForbidden(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl GroupError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::UserNotFound(_) => 404,
            Self::NameTaken(_) => 409,
            Self::EmptyName => 400,
            Self::RoleAssignmentForbidden(_) => 403,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "GROUP_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NameTaken(_) => "GROUP_NAME_TAKEN",
            Self::EmptyName => "VALIDATION_ERROR",
            Self::RoleAssignmentForbidden(_) => "ROLE_ASSIGNMENT_FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Group repository.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a group with the given inherited roles.
    ///
    /// # Errors
    ///
    /// Returns `NameTaken` if the name exists, `EmptyName` if blank.
    pub async fn create(&self, name: &str, roles: &[String]) -> Result<groups::Model, GroupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GroupError::EmptyName);
        }
        if self.find_by_name(name).await?.is_some() {
            return Err(GroupError::NameTaken(name.to_string()));
        }

        let now = chrono::Utc::now().into();
        let group = groups::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            roles: Set(roles_to_json(roles.iter().cloned())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(group_id = %group.id, name = %group.name, "Created group");
        Ok(group)
    }

    /// Lists groups by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<groups::Model>, GroupError> {
        Ok(groups::Entity::find()
            .order_by_asc(groups::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a group by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<groups::Model>, GroupError> {
        Ok(groups::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a group by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<groups::Model>, GroupError> {
        Ok(groups::Entity::find()
            .filter(groups::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// Adds a user to a group. Adding an existing member is a no-op.
    ///
    /// Returns `true` if a membership row was created.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` / `UserNotFound` if either side does not exist.
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, GroupError> {
        self.require_group(group_id).await?;
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(GroupError::UserNotFound(user_id))?;

        let existing = user_groups::Entity::find_by_id((user_id, group_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        user_groups::ActiveModel {
            user_id: Set(user_id),
            group_id: Set(group_id),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(%group_id, %user_id, "Added group member");
        Ok(true)
    }

    /// Removes a user from a group. Returns `false` if they were not a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, GroupError> {
        let result = user_groups::Entity::delete_by_id((user_id, group_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(%group_id, %user_id, "Removed group member");
        }
        Ok(result.rows_affected > 0)
    }

    /// Members of a group, ordered by email.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<users::Model>, GroupError> {
        let group = self.require_group(group_id).await?;
        Ok(group
            .find_related(users::Entity)
            .order_by_asc(users::Column::Email)
            .all(&self.db)
            .await?)
    }

    async fn require_group(&self, group_id: Uuid) -> Result<groups::Model, GroupError> {
        self.find_by_id(group_id)
            .await?
            .ok_or(GroupError::NotFound(group_id))
    }
}
