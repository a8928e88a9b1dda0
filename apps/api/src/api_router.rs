mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use clinica_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/me/access", get(handlers::access::current_access_handler))
        .route(
            "/api/me/access/check",
            get(handlers::access::check_access_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::catalog::list_permissions_handler),
        )
        .route(
            "/api/role-templates",
            get(handlers::catalog::list_role_templates_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .patch(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/assignments",
            post(handlers::assignments::assign_role_handler),
        )
        .route(
            "/api/roles/{role_id}/assignments/{user_id}",
            delete(handlers::assignments::remove_role_assignment_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::assignments::list_user_roles_handler),
        )
        .route(
            "/api/organizations/{organization_id}/seed",
            post(handlers::seeding::seed_organization_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
