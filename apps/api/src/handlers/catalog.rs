use axum::Json;
use axum::extract::{Extension, State};

use clinica_domain::Principal;

use crate::dto::{PermissionResponse, RoleTemplateResponse};
use crate::error::ApiResult;
use crate::operations;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    state
        .authorization_service
        .admit(&principal, &operations::LIST_PERMISSIONS)?;

    let permissions = state
        .role_service
        .list_catalog_permissions()
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn list_role_templates_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<RoleTemplateResponse>>> {
    state
        .authorization_service
        .admit(&principal, &operations::LIST_ROLE_TEMPLATES)?;

    let templates = state
        .role_service
        .list_role_templates()
        .iter()
        .map(RoleTemplateResponse::from)
        .collect();

    Ok(Json(templates))
}
