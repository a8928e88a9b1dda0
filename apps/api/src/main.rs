//! Clinica RBAC API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod operations;
mod state;

use clinica_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_services::{build_app_state, build_postgres_session_layer, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url, config.database_max_connections).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_layer = build_postgres_session_layer(
        pool.clone(),
        config.cookie_secure,
        config.session_idle_minutes,
    )
    .await?;
    let app_state = build_app_state(pool);

    if let Some(organization_id) = config.bootstrap_organization_id {
        let report = app_state
            .role_seeding_service
            .seed_organization(organization_id)
            .await?;
        info!(
            organization_id = %report.organization_id,
            roles_created = report.roles.iter().filter(|role| role.created).count(),
            "bootstrap organization seeded"
        );
    }

    let app = api_router::build_router(app_state, &config.frontend_url, session_layer)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "clinica-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
