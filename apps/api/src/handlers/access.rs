use axum::Json;
use axum::extract::{Extension, Query, State};

use clinica_domain::{PermissionAction, Principal};

use crate::dto::{AccessCheckQuery, AccessDecisionResponse, AccessResponse};
use crate::error::ApiResult;
use crate::operations;
use crate::state::AppState;

pub async fn current_access_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<AccessResponse>> {
    state
        .authorization_service
        .admit(&principal, &operations::CURRENT_ACCESS)?;

    Ok(Json(AccessResponse::from(&principal)))
}

pub async fn check_access_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AccessCheckQuery>,
) -> ApiResult<Json<AccessDecisionResponse>> {
    state
        .authorization_service
        .admit(&principal, &operations::CHECK_ACCESS)?;
    let action = PermissionAction::from_transport(query.action.as_str())?;

    let decision =
        state
            .authorization_service
            .check(&principal, query.resource.trim(), action);

    Ok(Json(AccessDecisionResponse::from(decision)))
}
