//! Atrium API Server
//!
//! Main entry point for the Atrium backend service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_api::{AppState, create_router};
use atrium_core::authz::AuthorizationEngine;
use atrium_core::workflow::{WorkflowEngine, WorkflowPolicy};
use atrium_db::connect_with_pool;
use atrium_db::repositories::CatalogCache;
use atrium_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let authorization = AuthorizationEngine::new(config.authorization.admin_role.clone());
    let policy = WorkflowPolicy::from(&config.workflow);
    info!(
        admin_role = %config.authorization.admin_role,
        resource_cache_ttl_secs = config.authorization.resource_cache_ttl_secs,
        allow_reopen_paid = policy.allow_reopen_paid,
        require_total_before_invoice = policy.require_total_before_invoice,
        "Authorization and workflow configured"
    );

    let state = AppState::new(
        db,
        JwtService::new(JwtConfig::from(&config.jwt)),
        authorization,
        CatalogCache::with_ttl(config.authorization.resource_cache_ttl_secs),
        WorkflowEngine::with_policy(policy),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
