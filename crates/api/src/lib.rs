//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for transactions, groups and permission grants
//! - JWT authentication middleware
//! - The per-request access context extractor
//! - Error to response mapping

pub mod access;
pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use atrium_core::authz::AuthorizationEngine;
use atrium_core::workflow::WorkflowEngine;
use atrium_db::repositories::CatalogCache;
use atrium_db::{PermissionRepository, WorkflowRepository};
use atrium_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Permission store with the cached resource catalog.
    pub permissions: Arc<PermissionRepository>,
    /// Workflow persistence bound to the configured policy.
    pub workflow: Arc<WorkflowRepository>,
}

impl AppState {
    /// Wires repositories that share the one connection pool.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        authorization: AuthorizationEngine,
        catalog_cache: CatalogCache,
        workflow: WorkflowEngine,
    ) -> Self {
        Self {
            permissions: Arc::new(PermissionRepository::new(
                db.clone(),
                authorization,
                catalog_cache,
            )),
            workflow: Arc::new(WorkflowRepository::new(db.clone(), workflow)),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support;
