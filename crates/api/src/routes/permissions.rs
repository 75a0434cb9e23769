//! Resource types, group grants, and the caller's own permission matrix.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::access::{
    Access,
    resources::{PERMISSION_GRANT, RESOURCE_TYPE},
};
use crate::error::error_response;
use atrium_core::authz::Action;
use atrium_db::repositories::CreateResourceTypeInput;

/// Creates the permission routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resource-types",
            get(list_resource_types).post(create_resource_type),
        )
        .route("/groups/{id}/grants", get(list_grants))
        .route("/groups/{id}/grants/{resource_type_id}", put(set_grant))
        .route("/me/permissions", get(my_permissions))
}

/// Request body for creating a resource type.
#[derive(Debug, Deserialize)]
pub struct CreateResourceTypeRequest {
    /// Unique code, e.g. `Project`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Display-only icon identifier.
    pub icon: Option<String>,
}

/// Request body for setting a grant. Both flags false removes it.
#[derive(Debug, Deserialize)]
pub struct SetGrantRequest {
    /// Read access.
    #[serde(default)]
    pub can_read: bool,
    /// Write access.
    #[serde(default)]
    pub can_write: bool,
}

/// GET `/resource-types`
async fn list_resource_types(State(state): State<AppState>, access: Access) -> Response {
    if let Err(response) = access.require(Action::Read, RESOURCE_TYPE) {
        return response;
    }

    match state.permissions.list_resource_types().await {
        Ok(types) => Json(json!({ "resource_types": types })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/resource-types`
async fn create_resource_type(
    State(state): State<AppState>,
    access: Access,
    Json(payload): Json<CreateResourceTypeRequest>,
) -> Response {
    if let Err(response) = access.require(Action::Write, RESOURCE_TYPE) {
        return response;
    }

    let input = CreateResourceTypeInput {
        code: payload.code,
        name: payload.name,
        icon: payload.icon,
    };
    match state.permissions.create_resource_type(input).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/groups/{id}/grants`
async fn list_grants(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Read, PERMISSION_GRANT) {
        return response;
    }

    match state.permissions.list_group_grants(id).await {
        Ok(grants) => Json(json!({ "grants": grants })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/groups/{id}/grants/{resource_type_id}` - Upsert, or remove when both
/// flags are false.
async fn set_grant(
    State(state): State<AppState>,
    access: Access,
    Path((id, resource_type_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetGrantRequest>,
) -> Response {
    if let Err(response) = access.require(Action::Write, PERMISSION_GRANT) {
        return response;
    }

    match state
        .permissions
        .set_grant(id, resource_type_id, payload.can_read, payload.can_write)
        .await
    {
        Ok(grant) => Json(json!({ "grant": grant })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/me/permissions` - Read/write flags for every resource type.
async fn my_permissions(access: Access) -> Response {
    let context = access.context();
    Json(json!({
        "user_id": access.user_id(),
        "superuser": context.is_superuser(),
        "permissions": context.permission_matrix(),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use crate::test_support::{
        TestApp, catalog_rows, empty_request, grant_row, group_row, json_request, read_json,
        resource_type_row, router, token_for, user_row, with_access, with_group_access,
    };
    use atrium_db::entities::resource_types;

    #[tokio::test]
    async fn test_me_permissions_for_group_member() {
        let user = user_row(&[]);
        let group = group_row("Editors");
        let catalog = catalog_rows();
        let transaction_rt = catalog.iter().find(|r| r.code == "Transaction").unwrap();
        let group_rt = catalog.iter().find(|r| r.code == "Group").unwrap();
        let grants = vec![
            grant_row(&group, transaction_rt, true, true),
            grant_row(&group, group_rt, true, false),
        ];
        let db = with_group_access(
            MockDatabase::new(DatabaseBackend::Postgres),
            catalog.clone(),
            &user,
            &group,
            grants,
        )
        .into_connection();

        let response = router(db)
            .send(empty_request(
                "GET",
                "/api/v1/me/permissions",
                Some(&token_for(&user)),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["superuser"], false);
        assert_eq!(
            body["permissions"],
            json!([
                { "code": "Group", "name": "Group", "can_read": true, "can_write": false },
                { "code": "PermissionGrant", "name": "PermissionGrant", "can_read": false, "can_write": false },
                { "code": "ResourceType", "name": "ResourceType", "can_read": false, "can_write": false },
                { "code": "Transaction", "name": "Transaction", "can_read": true, "can_write": true },
            ])
        );
    }

    #[tokio::test]
    async fn test_me_permissions_for_admin() {
        let admin = user_row(&["ROLE_ADMIN"]);
        let db =
            with_access(MockDatabase::new(DatabaseBackend::Postgres), &admin).into_connection();

        let response = router(db)
            .send(empty_request(
                "GET",
                "/api/v1/me/permissions",
                Some(&token_for(&admin)),
            ))
            .await;

        let body = read_json(response).await;
        assert_eq!(body["superuser"], true);
        let all_granted = body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["can_read"] == true && p["can_write"] == true);
        assert!(all_granted);
    }

    #[tokio::test]
    async fn test_admin_creates_resource_type() {
        let admin = user_row(&["ROLE_ADMIN"]);
        let created = resource_type_row("Project");
        let db = with_access(MockDatabase::new(DatabaseBackend::Postgres), &admin)
            .append_query_results([Vec::<resource_types::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let response = router(db)
            .send(json_request(
                "POST",
                "/api/v1/resource-types",
                Some(&token_for(&admin)),
                &json!({ "code": "Project", "name": "Project" }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["code"], "Project");
    }

    #[tokio::test]
    async fn test_grant_write_requires_permission_grant_write() {
        let user = user_row(&[]);
        let group = group_row("Editors");
        let catalog = catalog_rows();
        let grant_rt = catalog.iter().find(|r| r.code == "PermissionGrant").unwrap();
        let grants = vec![grant_row(&group, grant_rt, true, false)];
        let db = with_group_access(
            MockDatabase::new(DatabaseBackend::Postgres),
            catalog.clone(),
            &user,
            &group,
            grants,
        )
        .into_connection();

        let response = router(db)
            .send(json_request(
                "PUT",
                &format!("/api/v1/groups/{}/grants/{}", group.id, grant_rt.id),
                Some(&token_for(&user)),
                &json!({ "can_read": true, "can_write": true }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
