use chrono::{DateTime, Utc};
use clinica_application::{RoleDefinition, RoleDeletion};
use clinica_core::AppError;
use clinica_domain::{PermissionDefinition, RoleTemplate, UserRoleAssignment};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl From<&PermissionDefinition> for PermissionResponse {
    fn from(value: &PermissionDefinition) -> Self {
        Self {
            name: value.name.to_owned(),
            resource: value.resource.to_owned(),
            action: value.action.as_str().to_owned(),
            description: value.description.to_owned(),
        }
    }
}

/// Default role template.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-template-response.ts"
)]
pub struct RoleTemplateResponse {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

impl From<&RoleTemplate> for RoleTemplateResponse {
    fn from(value: &RoleTemplate) -> Self {
        Self {
            name: value.name.to_owned(),
            description: value.description.to_owned(),
            permissions: value
                .permission_names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Optional organization selector for unscoped callers.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizationQuery {
    pub organization_id: Option<String>,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload for role updates. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_system: Option<bool>,
    pub permissions: Option<Vec<String>>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub organization_id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: String,
    pub permissions: Vec<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role.id().to_string(),
            organization_id: value.role.organization_id().to_string(),
            name: value.role.name().to_string(),
            description: value.role.description().to_owned(),
            is_system: value.role.is_system(),
            is_active: value.role.is_active(),
            created_at: value.role.created_at().to_rfc3339(),
            permissions: value
                .permissions
                .iter()
                .map(|permission| permission.name().to_owned())
                .collect(),
        }
    }
}

/// Outcome of a role deletion.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-deletion-response.ts"
)]
pub struct RoleDeletionResponse {
    pub role_id: String,
    pub role_name: String,
    pub revoked_assignments: u64,
}

impl From<RoleDeletion> for RoleDeletionResponse {
    fn from(value: RoleDeletion) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            role_name: value.role_name,
            revoked_assignments: value.revoked_assignments,
        }
    }
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub user_id: String,
    /// RFC 3339 timestamp.
    pub expires_at: Option<String>,
}

impl AssignRoleRequest {
    pub fn parsed_expires_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        self.expires_at
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|timestamp| timestamp.with_timezone(&Utc))
                    .map_err(|error| {
                        AppError::InvalidInput(format!("invalid expires_at '{value}': {error}"))
                    })
            })
            .transpose()
    }
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role_id: String,
    pub assigned_by: String,
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl From<UserRoleAssignment> for RoleAssignmentResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            role_id: value.role_id().to_string(),
            assigned_by: value.assigned_by().to_string(),
            expires_at: value.expires_at().map(|expires_at| expires_at.to_rfc3339()),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}
