use clinica_domain::{AccessDecision, AllowReason, DenyReason, Principal};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Access summary of the current caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-response.ts"
)]
pub struct AccessResponse {
    pub user_id: String,
    pub organization_id: Option<String>,
    pub is_super_admin: bool,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<&Principal> for AccessResponse {
    fn from(value: &Principal) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            organization_id: value.organization_id().map(|id| id.to_string()),
            is_super_admin: value.is_super_admin(),
            roles: value.roles().to_vec(),
            permissions: value
                .permissions()
                .iter()
                .map(|permission| permission.name().to_owned())
                .collect(),
        }
    }
}

/// Query string of an access check.
#[derive(Debug, Deserialize)]
pub struct AccessCheckQuery {
    pub resource: String,
    pub action: String,
}

/// Decision returned by an access check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-decision-response.ts"
)]
pub struct AccessDecisionResponse {
    pub allowed: bool,
    pub reason: String,
    pub permission: Option<String>,
}

impl From<AccessDecision> for AccessDecisionResponse {
    fn from(value: AccessDecision) -> Self {
        match value {
            AccessDecision::Allow(AllowReason::SuperAdmin) => Self {
                allowed: true,
                reason: "super_admin".to_owned(),
                permission: None,
            },
            AccessDecision::Allow(AllowReason::Granted { permission }) => Self {
                allowed: true,
                reason: "granted".to_owned(),
                permission: Some(permission),
            },
            AccessDecision::Allow(AllowReason::ManageWildcard { permission }) => Self {
                allowed: true,
                reason: "manage_wildcard".to_owned(),
                permission: Some(permission),
            },
            AccessDecision::Deny(DenyReason::MissingPermission { required }) => Self {
                allowed: false,
                reason: "missing_permission".to_owned(),
                permission: Some(required.to_string()),
            },
        }
    }
}
