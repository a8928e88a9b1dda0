use clinica_application::{SeedReport, SeededRole};
use serde::Serialize;
use ts_rs::TS;

/// Outcome of seeding one template role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seeded-role-response.ts"
)]
pub struct SeededRoleResponse {
    pub name: String,
    pub created: bool,
    pub permissions_assigned: usize,
}

impl From<SeededRole> for SeededRoleResponse {
    fn from(value: SeededRole) -> Self {
        Self {
            name: value.name,
            created: value.created,
            permissions_assigned: value.permissions_assigned,
        }
    }
}

/// Outcome of seeding an organization.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seed-report-response.ts"
)]
pub struct SeedReportResponse {
    pub organization_id: String,
    pub permissions_created: usize,
    pub roles: Vec<SeededRoleResponse>,
}

impl From<SeedReport> for SeedReportResponse {
    fn from(value: SeedReport) -> Self {
        Self {
            organization_id: value.organization_id.to_string(),
            permissions_created: value.permissions_created,
            roles: value
                .roles
                .into_iter()
                .map(SeededRoleResponse::from)
                .collect(),
        }
    }
}
