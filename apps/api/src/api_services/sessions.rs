use clinica_core::AppError;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

/// Session table written by the authentication service at sign-in.
const SESSION_TABLE: &str = "tower_sessions";

/// Builds the session layer that exposes signed-in identities to `require_auth`.
pub async fn build_postgres_session_layer(
    pool: PgPool,
    cookie_secure: bool,
    idle_minutes: i64,
) -> Result<SessionManagerLayer<PostgresStore>, AppError> {
    let store = PostgresStore::new(pool)
        .with_table_name(SESSION_TABLE)
        .map_err(|error| {
            AppError::InvalidInput(format!("invalid session table '{SESSION_TABLE}': {error}"))
        })?;
    store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to prepare session table: {error}"))
    })?;

    Ok(SessionManagerLayer::new(store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(idle_minutes))))
}
