use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use clinica_core::{AppError, AppResult, NonEmptyString, OrganizationId, UserId};
use clinica_domain::{
    PermissionDefinition, PermissionId, Role, RoleChanges, RoleId, RoleTemplate, TenantContext,
    UserRoleAssignment, catalog_permissions, role_templates,
};

use crate::{
    AssignRoleInput, CreateRoleInput, PermissionRepository, RoleAssignmentRepository,
    RoleDefinition, RoleDeletion, RoleRepository, UpdateRoleInput,
};

#[cfg(test)]
mod tests;

/// Application service for the role lifecycle and user role assignments.
#[derive(Clone)]
pub struct RoleService {
    permission_repository: Arc<dyn PermissionRepository>,
    role_repository: Arc<dyn RoleRepository>,
    assignment_repository: Arc<dyn RoleAssignmentRepository>,
}

impl RoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        role_repository: Arc<dyn RoleRepository>,
        assignment_repository: Arc<dyn RoleAssignmentRepository>,
    ) -> Self {
        Self {
            permission_repository,
            role_repository,
            assignment_repository,
        }
    }

    /// Returns the compiled-in permission catalog.
    #[must_use]
    pub fn list_catalog_permissions(&self) -> &'static [PermissionDefinition] {
        catalog_permissions()
    }

    /// Returns the default role templates.
    #[must_use]
    pub fn list_role_templates(&self) -> &'static [RoleTemplate] {
        role_templates()
    }

    /// Lists organization roles with their permissions.
    pub async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<RoleDefinition>> {
        self.role_repository.list_roles(organization_id).await
    }

    /// Returns one role with its permissions.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<RoleDefinition> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Returns a role only if it is visible in the tenant context.
    ///
    /// Roles of other organizations are reported as missing.
    pub async fn get_role_in_scope(
        &self,
        context: &TenantContext,
        role_id: RoleId,
    ) -> AppResult<RoleDefinition> {
        let role = self.get_role(role_id).await?;
        if !context.permits(role.role.organization_id()) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(role)
    }

    /// Creates a custom role with the requested permissions.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let name = NonEmptyString::new(input.name)?;
        self.ensure_name_available(input.organization_id, &name, None)
            .await?;
        let permission_ids = self
            .resolve_permission_ids(&input.permission_names)
            .await?;

        let role = Role::new(input.organization_id, name, input.description);
        let created = self
            .role_repository
            .create_role(role, &permission_ids)
            .await?;

        info!(
            role_id = %created.role.id(),
            organization_id = %created.role.organization_id(),
            role_name = %created.role.name(),
            permissions = created.permissions.len(),
            "role created"
        );
        Ok(created)
    }

    /// Updates a role. A permission list replaces the whole permission set.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let existing = self.get_role(role_id).await?;
        let changes = RoleChanges {
            name: input.name.map(NonEmptyString::new).transpose()?,
            description: input.description,
            is_active: input.is_active,
            is_system: input.is_system,
        };
        let updated = existing.role.apply(&changes)?;

        if updated.name() != existing.role.name() {
            self.ensure_name_available(updated.organization_id(), updated.name(), Some(role_id))
                .await?;
        }

        let permission_ids = match &input.permission_names {
            Some(names) => Some(self.resolve_permission_ids(names).await?),
            None => None,
        };

        let saved = self
            .role_repository
            .update_role(updated, permission_ids.as_deref())
            .await?;

        info!(
            role_id = %role_id,
            role_name = %saved.role.name(),
            permissions_replaced = permission_ids.is_some(),
            "role updated"
        );
        Ok(saved)
    }

    /// Deletes a custom role along with its permission links and assignments.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<RoleDeletion> {
        let existing = self.get_role(role_id).await?;
        existing.role.ensure_deletable()?;

        let revoked_assignments = self.role_repository.delete_role(role_id).await?;

        info!(
            role_id = %role_id,
            role_name = %existing.role.name(),
            revoked_assignments,
            "role deleted"
        );
        Ok(RoleDeletion {
            role_id,
            role_name: existing.role.name().to_string(),
            revoked_assignments,
        })
    }

    /// Assigns a role to a user.
    pub async fn assign_user_role(&self, input: AssignRoleInput) -> AppResult<UserRoleAssignment> {
        let role = self.get_role(input.role_id).await?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::InvalidInput(format!(
                "expiry '{expires_at}' is not in the future"
            )));
        }

        let assignment = UserRoleAssignment::new(
            input.user_id,
            input.role_id,
            input.assigned_by,
            input.expires_at,
        );
        self.assignment_repository
            .assign_role(assignment.clone())
            .await?;

        info!(
            user_id = %input.user_id,
            role_id = %input.role_id,
            role_name = %role.role.name(),
            assigned_by = %input.assigned_by,
            "role assigned"
        );
        Ok(assignment)
    }

    /// Removes a role from a user.
    pub async fn remove_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.assignment_repository
            .remove_role(user_id, role_id)
            .await?;

        info!(user_id = %user_id, role_id = %role_id, "role unassigned");
        Ok(())
    }

    /// Lists role assignments held by a user.
    pub async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        self.assignment_repository.list_user_roles(user_id).await
    }

    /// Lists a user's assignments whose role is visible in the tenant context.
    pub async fn list_user_roles_in_scope(
        &self,
        context: &TenantContext,
        user_id: UserId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let mut visible = Vec::new();
        for assignment in self.list_user_roles(user_id).await? {
            if let Some(role) = self.role_repository.find_role(assignment.role_id()).await?
                && context.permits(role.role.organization_id())
            {
                visible.push(assignment);
            }
        }

        Ok(visible)
    }

    async fn ensure_name_available(
        &self,
        organization_id: OrganizationId,
        name: &NonEmptyString,
        current_role_id: Option<RoleId>,
    ) -> AppResult<()> {
        let existing = self
            .role_repository
            .find_role_by_name(organization_id, name.as_str())
            .await?;

        match existing {
            Some(role) if Some(role.id()) != current_role_id => Err(AppError::Conflict(format!(
                "role '{name}' already exists in organization '{organization_id}'"
            ))),
            _ => Ok(()),
        }
    }

    async fn resolve_permission_ids(&self, names: &[String]) -> AppResult<Vec<PermissionId>> {
        let stored: HashMap<String, PermissionId> = self
            .permission_repository
            .list_permissions()
            .await?
            .into_iter()
            .map(|permission| (permission.name().to_owned(), permission.id()))
            .collect();

        let mut seen = HashSet::new();
        let mut permission_ids = Vec::new();
        for name in names {
            let name = name.trim();
            if !seen.insert(name) {
                continue;
            }

            let permission_id = stored.get(name).copied().ok_or_else(|| {
                AppError::InvalidInput(format!("unknown permission '{name}'"))
            })?;
            permission_ids.push(permission_id);
        }

        Ok(permission_ids)
    }
}
