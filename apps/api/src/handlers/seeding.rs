use axum::Json;
use axum::extract::{Extension, Path, State};

use clinica_core::{AppError, OrganizationId};
use clinica_domain::Principal;

use crate::dto::SeedReportResponse;
use crate::error::ApiResult;
use crate::operations;
use crate::state::AppState;

pub async fn seed_organization_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(organization_id): Path<String>,
) -> ApiResult<Json<SeedReportResponse>> {
    state
        .authorization_service
        .admit(&principal, &operations::SEED_ORGANIZATION)?;
    let organization_id = organization_id.parse::<OrganizationId>()?;
    if !principal.is_super_admin() && principal.organization_id() != Some(organization_id) {
        return Err(AppError::Forbidden(format!(
            "organization '{organization_id}' is outside the caller's organization"
        ))
        .into());
    }

    let report = state
        .role_seeding_service
        .seed_organization(organization_id)
        .await?;

    Ok(Json(SeedReportResponse::from(report)))
}
