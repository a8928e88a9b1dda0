use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use clinica_application::{
    AuthorizationRepository, PermissionRepository, RoleAssignmentRepository, RoleDefinition,
    RoleRepository,
};
use clinica_core::{AppError, AppResult, OrganizationId, UserId};
use clinica_domain::{
    GrantedPermission, Permission, PermissionDefinition, PermissionId, Role, RoleGrant, RoleId,
    UserRoleAssignment,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct RbacState {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    role_permissions: HashMap<RoleId, BTreeSet<PermissionId>>,
    user_roles: HashMap<(UserId, RoleId), UserRoleAssignment>,
}

impl RbacState {
    fn role_permissions(&self, role_id: RoleId) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|permission_id| self.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        permissions
    }

    fn definition(&self, role: &Role) -> RoleDefinition {
        RoleDefinition {
            role: role.clone(),
            permissions: self.role_permissions(role.id()),
        }
    }

    fn name_taken(&self, role: &Role) -> bool {
        self.roles.values().any(|stored| {
            stored.id() != role.id()
                && stored.organization_id() == role.organization_id()
                && stored.name() == role.name()
        })
    }

    fn checked_permission_set(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<BTreeSet<PermissionId>> {
        permission_ids
            .iter()
            .map(|permission_id| {
                if self.permissions.contains_key(permission_id) {
                    Ok(*permission_id)
                } else {
                    Err(AppError::NotFound(format!(
                        "permission '{permission_id}' was not found"
                    )))
                }
            })
            .collect()
    }
}

/// Role store kept in process memory.
///
/// All four ports share one lock so each operation sees and leaves a
/// consistent state.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    state: RwLock<RbacState>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacStore {
    async fn ensure_permissions(&self, definitions: &[PermissionDefinition]) -> AppResult<usize> {
        let mut state = self.state.write().await;
        let mut created = 0;

        for definition in definitions {
            let exists = state
                .permissions
                .values()
                .any(|permission| permission.name() == definition.name);
            if exists {
                continue;
            }

            let key = definition.key();
            if state
                .permissions
                .values()
                .any(|permission| permission.key() == &key)
            {
                return Err(AppError::Conflict(format!(
                    "permission key '{key}' is already used by another name"
                )));
            }

            let permission = Permission::from_definition(definition);
            state.permissions.insert(permission.id(), permission);
            created += 1;
        }

        Ok(created)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacStore {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        let mut roles: Vec<RoleDefinition> = state
            .roles
            .values()
            .filter(|role| role.organization_id() == organization_id)
            .map(|role| state.definition(role))
            .collect();
        roles.sort_by(|left, right| left.role.name().cmp(right.role.name()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state.roles.get(&role_id).map(|role| state.definition(role)))
    }

    async fn find_role_by_name(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .values()
            .find(|role| role.organization_id() == organization_id && role.name().as_str() == name)
            .cloned())
    }

    async fn create_role(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        if state.roles.contains_key(&role.id()) || state.name_taken(&role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in organization '{}'",
                role.name(),
                role.organization_id()
            )));
        }

        let links = state.checked_permission_set(permission_ids)?;
        state.role_permissions.insert(role.id(), links);
        state.roles.insert(role.id(), role.clone());
        Ok(state.definition(&role))
    }

    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }
        if state.name_taken(&role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in organization '{}'",
                role.name(),
                role.organization_id()
            )));
        }

        if let Some(permission_ids) = permission_ids {
            let links = state.checked_permission_set(permission_ids)?;
            state.role_permissions.insert(role.id(), links);
        }
        state.roles.insert(role.id(), role.clone());
        Ok(state.definition(&role))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<u64> {
        let mut state = self.state.write().await;

        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        state.role_permissions.remove(&role_id);

        let before = state.user_roles.len();
        state
            .user_roles
            .retain(|(_, assigned_role_id), _| *assigned_role_id != role_id);
        Ok((before - state.user_roles.len()) as u64)
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryRbacStore {
    async fn assign_role(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        let mut state = self.state.write().await;
        let key = (assignment.user_id(), assignment.role_id());

        if !state.roles.contains_key(&key.1) {
            return Err(AppError::NotFound(format!("role '{}' was not found", key.1)));
        }
        if state.user_roles.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds role '{}'",
                key.0, key.1
            )));
        }

        state.user_roles.insert(key, assignment);
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.user_roles.remove(&(user_id, role_id)).is_none() {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_id}' was not found"
            )));
        }
        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<UserRoleAssignment> = state
            .user_roles
            .values()
            .filter(|assignment| assignment.user_id() == user_id)
            .cloned()
            .collect();
        assignments.sort_by_key(UserRoleAssignment::created_at);
        Ok(assignments)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacStore {
    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        let state = self.state.read().await;

        Ok(state
            .user_roles
            .values()
            .filter(|assignment| assignment.user_id() == user_id)
            .filter_map(|assignment| {
                let role = state.roles.get(&assignment.role_id())?;
                Some(RoleGrant {
                    role_id: role.id(),
                    role_name: role.name().to_string(),
                    organization_id: role.organization_id(),
                    role_is_active: role.is_active(),
                    expires_at: assignment.expires_at(),
                    permissions: state
                        .role_permissions(role.id())
                        .iter()
                        .map(GrantedPermission::from)
                        .collect(),
                })
            })
            .collect())
    }
}
