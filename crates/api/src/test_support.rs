//! Router fixtures for handler tests on a mock connection.
//!
//! `MockDatabase` answers queries strictly in the order they are queued, so
//! each helper documents which queries it stands in for.

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use atrium_core::authz::AuthorizationEngine;
use atrium_core::workflow::WorkflowEngine;
use atrium_db::entities::{
    groups, permission_grants, resource_types, roles_to_json,
    sea_orm_active_enums::{TransactionStatus, TransactionType},
    transactions, users,
};
use atrium_db::repositories::CatalogCache;
use atrium_shared::{JwtConfig, JwtService};

use crate::{AppState, create_router};

pub(crate) fn state(db: DatabaseConnection) -> AppState {
    AppState::new(
        db,
        JwtService::new(JwtConfig::default()),
        AuthorizationEngine::default(),
        CatalogCache::default(),
        WorkflowEngine::default(),
    )
}

pub(crate) fn router(db: DatabaseConnection) -> Router {
    create_router(state(db))
}

pub(crate) fn token_for(user: &users::Model) -> String {
    JwtService::new(JwtConfig::default())
        .generate_access_token(user.id, &user.email, user.role_set().into_iter().collect())
        .unwrap()
}

pub(crate) fn user_row(roles: &[&str]) -> users::Model {
    let now = Utc::now().into();
    users::Model {
        id: Uuid::now_v7(),
        email: "dana@example.com".to_string(),
        password_hash: String::new(),
        full_name: "Dana Example".to_string(),
        roles: roles_to_json(roles.iter().map(ToString::to_string)),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn group_row(name: &str) -> groups::Model {
    let now = Utc::now().into();
    groups::Model {
        id: Uuid::now_v7(),
        name: name.to_string(),
        roles: roles_to_json(Vec::<String>::new()),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn resource_type_row(code: &str) -> resource_types::Model {
    let now = Utc::now().into();
    resource_types::Model {
        id: Uuid::now_v7(),
        code: code.to_string(),
        name: code.to_string(),
        icon: None,
        created_at: now,
        updated_at: now,
    }
}

/// The resource types the API gates on.
pub(crate) fn catalog_rows() -> Vec<resource_types::Model> {
    ["Group", "PermissionGrant", "ResourceType", "Transaction"]
        .into_iter()
        .map(resource_type_row)
        .collect()
}

pub(crate) fn grant_row(
    group: &groups::Model,
    resource: &resource_types::Model,
    can_read: bool,
    can_write: bool,
) -> permission_grants::Model {
    let now = Utc::now().into();
    permission_grants::Model {
        id: Uuid::now_v7(),
        group_id: group.id,
        resource_type_id: resource.id,
        can_read,
        can_write,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn transaction_row(
    id: Uuid,
    status: TransactionStatus,
    version: i32,
) -> transactions::Model {
    let now = Utc::now().into();
    transactions::Model {
        id,
        number: "TX-2026-000007".to_string(),
        title: "Stand construction".to_string(),
        transaction_type: TransactionType::Order,
        status,
        customer_id: None,
        assignee_id: None,
        net_total: dec!(1000),
        tax_total: dec!(190),
        gross_total: dec!(1190),
        currency: "EUR".to_string(),
        version,
        created_by: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Queues the access-context load for a user without groups:
/// catalog, user, memberships.
pub(crate) fn with_access(db: MockDatabase, user: &users::Model) -> MockDatabase {
    db.append_query_results([catalog_rows()])
        .append_query_results([vec![user.clone()]])
        .append_query_results([Vec::<groups::Model>::new()])
}

/// Queues the access-context load for a member of `group`:
/// catalog, user, memberships, grants.
pub(crate) fn with_group_access(
    db: MockDatabase,
    catalog: Vec<resource_types::Model>,
    user: &users::Model,
    group: &groups::Model,
    grants: Vec<permission_grants::Model>,
) -> MockDatabase {
    db.append_query_results([catalog])
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![group.clone()]])
        .append_query_results([grants])
}

pub(crate) fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub(crate) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub(crate) async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub(crate) trait TestApp {
    async fn send(self, request: Request<Body>) -> Response;
}

impl TestApp for Router {
    async fn send(self, request: Request<Body>) -> Response {
        self.oneshot(request).await.unwrap()
    }
}
