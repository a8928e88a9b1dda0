use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use clinica_core::{AppError, AppResult, AuthenticatedUser};
use clinica_domain::{
    AccessDecision, OperationDescriptor, PermissionAction, Principal, TenantContext,
    TenantRequirement, authorize, flatten_role_grants,
};

use crate::AuthorizationRepository;


/// Application service for principal resolution and authorization checks.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Builds the principal for one request from current role store state.
    ///
    /// Nothing is cached: role changes are visible on the next request.
    pub async fn resolve_principal(&self, identity: &AuthenticatedUser) -> AppResult<Principal> {
        if !identity.is_active() {
            return Err(AppError::Unauthorized(format!(
                "user '{}' is inactive",
                identity.user_id()
            )));
        }

        let grants = self
            .repository
            .list_role_grants_for_user(identity.user_id())
            .await?;

        Ok(Principal::new(
            identity,
            flatten_role_grants(&grants, identity.organization_id(), Utc::now()),
        ))
    }

    /// Returns the decision for a principal and a requested action.
    #[must_use]
    pub fn check(
        &self,
        principal: &Principal,
        resource: &str,
        action: PermissionAction,
    ) -> AccessDecision {
        authorize(principal, resource, action)
    }

    /// Ensures the principal holds the permission; a deny becomes `Forbidden`.
    pub fn require_permission(
        &self,
        principal: &Principal,
        resource: &str,
        action: PermissionAction,
    ) -> AppResult<()> {
        match authorize(principal, resource, action) {
            AccessDecision::Allow(_) => Ok(()),
            AccessDecision::Deny(reason) => {
                debug!(user_id = %principal.user_id(), ?reason, "authorization denied");
                Err(AppError::Forbidden(format!(
                    "user '{}' is missing permission '{resource}:{action}'",
                    principal.user_id()
                )))
            }
        }
    }

    /// Resolves the tenant context for an operation.
    pub fn require_tenant(
        &self,
        principal: &Principal,
        requirement: TenantRequirement,
    ) -> AppResult<TenantContext> {
        TenantContext::require(principal, requirement).inspect_err(|error| {
            debug!(user_id = %principal.user_id(), %error, "tenant context rejected");
        })
    }

    /// Admits a principal into an operation: tenant check first, then the
    /// operation's permission. Returns the operation's tenant context.
    pub fn admit(
        &self,
        principal: &Principal,
        operation: &OperationDescriptor,
    ) -> AppResult<TenantContext> {
        let context = self.require_tenant(principal, operation.tenant)?;

        if let Some(permission) = operation.permission {
            self.require_permission(principal, permission.resource, permission.action)?;
        }

        debug!(
            user_id = %principal.user_id(),
            operation = operation.name,
            scope = ?context.scope(),
            "operation admitted"
        );
        Ok(context)
    }
}
