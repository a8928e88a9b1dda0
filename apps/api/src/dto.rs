mod access;
mod roles;
mod seeding;

use serde::Serialize;
use ts_rs::TS;

pub use access::{AccessCheckQuery, AccessDecisionResponse, AccessResponse};
pub use roles::{
    AssignRoleRequest, CreateRoleRequest, OrganizationQuery, PermissionResponse,
    RoleAssignmentResponse, RoleDeletionResponse, RoleResponse, RoleTemplateResponse,
    UpdateRoleRequest,
};
pub use seeding::{SeedReportResponse, SeededRoleResponse};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
