use clinica_core::{AppError, AppResult, OrganizationId};
use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Denial reason returned when a tenant-scoped operation has no organization.
pub const ORGANIZATION_CONTEXT_REQUIRED: &str = "organization context required";

/// Whether an operation must run inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantRequirement {
    /// The operation must be scoped to an organization.
    Required,
    /// The operation runs without tenant scoping.
    NotRequired,
}

/// Organization scope resolved for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "organization_id", rename_all = "snake_case")]
pub enum TenantScope {
    /// No organization filter applies.
    Unscoped,
    /// Everything is confined to one organization.
    Organization(OrganizationId),
}

/// Tenant context of a single operation.
///
/// Built from the principal at the start of each operation and dropped with
/// it; there is no shared or ambient instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    scope: TenantScope,
    is_super_admin: bool,
}

impl TenantContext {
    /// Resolves the tenant context for an operation.
    pub fn require(principal: &Principal, requirement: TenantRequirement) -> AppResult<Self> {
        let scope = match requirement {
            TenantRequirement::NotRequired => TenantScope::Unscoped,
            TenantRequirement::Required if principal.is_super_admin() => TenantScope::Unscoped,
            TenantRequirement::Required => match principal.organization_id() {
                Some(organization_id) => TenantScope::Organization(organization_id),
                None => {
                    return Err(AppError::Forbidden(
                        ORGANIZATION_CONTEXT_REQUIRED.to_owned(),
                    ));
                }
            },
        };

        Ok(Self {
            scope,
            is_super_admin: principal.is_super_admin(),
        })
    }

    /// Returns the resolved scope.
    #[must_use]
    pub fn scope(&self) -> TenantScope {
        self.scope
    }

    /// Returns the scoped organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self.scope {
            TenantScope::Organization(organization_id) => Some(organization_id),
            TenantScope::Unscoped => None,
        }
    }

    /// Returns whether the operation runs for a super-admin.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether data of `organization_id` is visible in this context.
    #[must_use]
    pub fn permits(&self, organization_id: OrganizationId) -> bool {
        match self.scope {
            TenantScope::Organization(scoped) => scoped == organization_id,
            TenantScope::Unscoped => self.is_super_admin,
        }
    }

    /// Picks the organization an operation acts on.
    ///
    /// Scoped callers always act on their own organization. Unscoped
    /// super-admins must name one explicitly.
    pub fn target_organization(
        &self,
        requested: Option<OrganizationId>,
    ) -> AppResult<OrganizationId> {
        match (self.scope, requested) {
            (TenantScope::Organization(scoped), Some(requested)) if requested != scoped => {
                Err(AppError::Forbidden(format!(
                    "organization '{requested}' is outside the caller's organization"
                )))
            }
            (TenantScope::Organization(scoped), _) => Ok(scoped),
            (TenantScope::Unscoped, Some(requested)) if self.is_super_admin => Ok(requested),
            (TenantScope::Unscoped, None) if self.is_super_admin => Err(AppError::InvalidInput(
                "organization_id is required for unscoped callers".to_owned(),
            )),
            (TenantScope::Unscoped, _) => Err(AppError::Forbidden(
                ORGANIZATION_CONTEXT_REQUIRED.to_owned(),
            )),
        }
    }
}
