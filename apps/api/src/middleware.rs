use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use clinica_core::{AppError, AuthenticatedUser};
use tower_sessions::Session;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the authentication service stores the identity.
pub const SESSION_USER_KEY: &str = "authenticated_user";

/// Resolves the caller's principal for the request.
///
/// The principal is rebuilt from the role store on every request so role
/// changes apply immediately.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<AuthenticatedUser>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let principal = state
        .authorization_service
        .resolve_principal(&identity)
        .await?;
    debug!(
        user_id = %principal.user_id(),
        roles = principal.roles().len(),
        permissions = principal.permissions().len(),
        "principal resolved"
    );

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
