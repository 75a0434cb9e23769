//! Group and membership administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::AppState;
use crate::access::{Access, resources::GROUP};
use crate::error::error_response;
use atrium_core::authz::Action;
use atrium_db::GroupRepository;
use atrium_db::repositories::GroupError;
use atrium_db::entities::{groups, users};

/// Creates the group routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}/members", get(list_members))
        .route(
            "/groups/{id}/members/{user_id}",
            put(add_member).delete(remove_member),
        )
}

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Unique group name.
    pub name: String,
    /// Roles every member inherits.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Response for a group.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    /// Group ID.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// Inherited roles, sorted.
    pub roles: Vec<String>,
}

impl From<groups::Model> for GroupResponse {
    fn from(m: groups::Model) -> Self {
        Self {
            roles: m.role_set().into_iter().collect(),
            id: m.id,
            name: m.name,
        }
    }
}

/// Response for a group member.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Whether the account may sign in.
    pub is_active: bool,
}

impl From<users::Model> for MemberResponse {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            full_name: m.full_name,
            is_active: m.is_active,
        }
    }
}

/// Group roles reach every member, the admin role included, so setting them
/// or changing who holds them takes a superuser.
fn require_role_admin(access: &Access, group: &groups::Model) -> Result<(), Response> {
    if group.role_set().is_empty() || access.context().is_superuser() {
        return Ok(());
    }
    warn!(
        user_id = %access.user_id(),
        group_id = %group.id,
        "Rejected membership change on a role-carrying group"
    );
    Err(error_response(&GroupError::RoleAssignmentForbidden(
        group.name.clone(),
    )))
}

/// Loads the group and applies [`require_role_admin`].
async fn role_checked_group(
    repo: &GroupRepository,
    access: &Access,
    id: Uuid,
) -> Result<(), Response> {
    let group = match repo.find_by_id(id).await {
        Ok(Some(group)) => group,
        Ok(None) => return Err(error_response(&GroupError::NotFound(id))),
        Err(e) => return Err(error_response(&e)),
    };
    require_role_admin(access, &group)
}

/// GET `/groups`
async fn list_groups(State(state): State<AppState>, access: Access) -> Response {
    if let Err(response) = access.require(Action::Read, GROUP) {
        return response;
    }

    match GroupRepository::new((*state.db).clone()).list().await {
        Ok(rows) => {
            let items: Vec<GroupResponse> = rows.into_iter().map(Into::into).collect();
            Json(json!({ "groups": items })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/groups`
async fn create_group(
    State(state): State<AppState>,
    access: Access,
    Json(payload): Json<CreateGroupRequest>,
) -> Response {
    if let Err(response) = access.require(Action::Write, GROUP) {
        return response;
    }
    if !payload.roles.is_empty() && !access.context().is_superuser() {
        warn!(user_id = %access.user_id(), "Rejected group creation with roles");
        return error_response(&GroupError::RoleAssignmentForbidden(payload.name));
    }

    match GroupRepository::new((*state.db).clone())
        .create(&payload.name, &payload.roles)
        .await
    {
        Ok(group) => (StatusCode::CREATED, Json(GroupResponse::from(group))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/groups/{id}/members`
async fn list_members(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Read, GROUP) {
        return response;
    }

    match GroupRepository::new((*state.db).clone())
        .list_members(id)
        .await
    {
        Ok(members) => {
            let items: Vec<MemberResponse> = members.into_iter().map(Into::into).collect();
            Json(json!({ "members": items })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// PUT `/groups/{id}/members/{user_id}` - Idempotent.
async fn add_member(
    State(state): State<AppState>,
    access: Access,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Response {
    if let Err(response) = access.require(Action::Write, GROUP) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    if let Err(response) = role_checked_group(&repo, &access, id).await {
        return response;
    }
    match repo.add_member(id, user_id).await {
        Ok(added) => Json(json!({ "added": added })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/groups/{id}/members/{user_id}`
async fn remove_member(
    State(state): State<AppState>,
    access: Access,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Response {
    if let Err(response) = access.require(Action::Write, GROUP) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    if let Err(response) = role_checked_group(&repo, &access, id).await {
        return response;
    }
    match repo.remove_member(id, user_id).await {
        Ok(removed) => Json(json!({ "removed": removed })).into_response(),
        Err(e) => error_response(&e),
    }
}
