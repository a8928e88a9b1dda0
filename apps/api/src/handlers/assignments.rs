use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use clinica_application::AssignRoleInput;
use clinica_core::UserId;
use clinica_domain::{Principal, RoleId};

use crate::dto::{AssignRoleRequest, RoleAssignmentResponse};
use crate::error::ApiResult;
use crate::operations;
use crate::state::AppState;

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleAssignmentResponse>)> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::ASSIGN_ROLE)?;
    let role_id = role_id.parse::<RoleId>()?;
    let user_id = payload.user_id.parse::<UserId>()?;
    let expires_at = payload.parsed_expires_at()?;
    state
        .role_service
        .get_role_in_scope(&context, role_id)
        .await?;

    let assignment = state
        .role_service
        .assign_user_role(AssignRoleInput {
            user_id,
            role_id,
            assigned_by: principal.user_id(),
            expires_at,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoleAssignmentResponse::from(assignment)),
    ))
}

pub async fn remove_role_assignment_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((role_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::REMOVE_ROLE_ASSIGNMENT)?;
    let role_id = role_id.parse::<RoleId>()?;
    let user_id = user_id.parse::<UserId>()?;
    state
        .role_service
        .get_role_in_scope(&context, role_id)
        .await?;

    state
        .role_service
        .remove_user_role(user_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::LIST_USER_ROLES)?;
    let user_id = user_id.parse::<UserId>()?;

    let assignments = state
        .role_service
        .list_user_roles_in_scope(&context, user_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
