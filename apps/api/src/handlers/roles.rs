use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use clinica_application::{CreateRoleInput, UpdateRoleInput};
use clinica_core::{AppResult, OrganizationId};
use clinica_domain::{Principal, RoleId};

use crate::dto::{
    CreateRoleRequest, OrganizationQuery, RoleDeletionResponse, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::operations;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<OrganizationQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::LIST_ROLES)?;
    let organization_id = context.target_organization(requested_organization(&query)?)?;

    let roles = state
        .role_service
        .list_roles(organization_id)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<OrganizationQuery>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::CREATE_ROLE)?;
    let organization_id = context.target_organization(requested_organization(&query)?)?;

    let role = state
        .role_service
        .create_role(CreateRoleInput {
            organization_id,
            name: payload.name,
            description: payload.description,
            permission_names: payload.permissions,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::GET_ROLE)?;
    let role_id = role_id.parse::<RoleId>()?;

    let role = state
        .role_service
        .get_role_in_scope(&context, role_id)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::UPDATE_ROLE)?;
    let role_id = role_id.parse::<RoleId>()?;
    state
        .role_service
        .get_role_in_scope(&context, role_id)
        .await?;

    let role = state
        .role_service
        .update_role(
            role_id,
            UpdateRoleInput {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
                is_system: payload.is_system,
                permission_names: payload.permissions,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleDeletionResponse>> {
    let context = state
        .authorization_service
        .admit(&principal, &operations::DELETE_ROLE)?;
    let role_id = role_id.parse::<RoleId>()?;
    state
        .role_service
        .get_role_in_scope(&context, role_id)
        .await?;

    let deletion = state.role_service.delete_role(role_id).await?;

    Ok(Json(RoleDeletionResponse::from(deletion)))
}

fn requested_organization(query: &OrganizationQuery) -> AppResult<Option<OrganizationId>> {
    query
        .organization_id
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(str::parse::<OrganizationId>)
        .transpose()
}
