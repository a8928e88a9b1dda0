use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use clinica_core::{AppError, AppResult, AuthenticatedUser, OrganizationId, UserId};
use clinica_domain::{
    GrantedPermission, Permission, PermissionDefinition, PermissionId, Role, RoleGrant, RoleId,
    UserRoleAssignment,
};

use crate::{
    AuthorizationRepository, PermissionRepository, RoleAssignmentRepository, RoleDefinition,
    RoleRepository,
};

#[derive(Default)]
struct FakeState {
    permissions: Vec<Permission>,
    roles: HashMap<RoleId, Role>,
    links: Vec<(RoleId, PermissionId)>,
    assignments: Vec<UserRoleAssignment>,
}

impl FakeState {
    fn definition(&self, role: &Role) -> RoleDefinition {
        let mut permissions: Vec<Permission> = self
            .links
            .iter()
            .filter(|(role_id, _)| *role_id == role.id())
            .filter_map(|(_, permission_id)| {
                self.permissions
                    .iter()
                    .find(|permission| permission.id() == *permission_id)
                    .cloned()
            })
            .collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));

        RoleDefinition {
            role: role.clone(),
            permissions,
        }
    }

    fn link(&mut self, role_id: RoleId, permission_ids: &[PermissionId]) {
        for permission_id in permission_ids {
            if !self.links.contains(&(role_id, *permission_id)) {
                self.links.push((role_id, *permission_id));
            }
        }
    }
}

/// Minimal store fake shared by service tests.
#[derive(Default)]
pub(crate) struct FakeRbacStore {
    state: Mutex<FakeState>,
}

impl FakeRbacStore {
    pub(crate) async fn role_count(&self, organization_id: OrganizationId) -> usize {
        self.state
            .lock()
            .await
            .roles
            .values()
            .filter(|role| role.organization_id() == organization_id)
            .count()
    }

    pub(crate) async fn link_count(&self) -> usize {
        self.state.lock().await.links.len()
    }

    pub(crate) async fn assignment_count(&self) -> usize {
        self.state.lock().await.assignments.len()
    }
}

#[async_trait]
impl PermissionRepository for FakeRbacStore {
    async fn ensure_permissions(&self, definitions: &[PermissionDefinition]) -> AppResult<usize> {
        let mut state = self.state.lock().await;
        let mut created = 0;
        for definition in definitions {
            if state
                .permissions
                .iter()
                .all(|permission| permission.name() != definition.name)
            {
                state.permissions.push(Permission::from_definition(definition));
                created += 1;
            }
        }
        Ok(created)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.state.lock().await.permissions.clone())
    }
}

#[async_trait]
impl RoleRepository for FakeRbacStore {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.lock().await;
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
        let state = self.state.lock().await;
        Ok(state.roles.get(&role_id).map(|role| state.definition(role)))
    }

    async fn find_role_by_name(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
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
        let mut state = self.state.lock().await;
        if state.roles.values().any(|stored| {
            stored.organization_id() == role.organization_id() && stored.name() == role.name()
        }) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        state.link(role.id(), permission_ids);
        state.roles.insert(role.id(), role.clone());
        Ok(state.definition(&role))
    }

    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!("role '{}' was not found", role.id())));
        }

        if let Some(permission_ids) = permission_ids {
            state.links.retain(|(role_id, _)| *role_id != role.id());
            state.link(role.id(), permission_ids);
        }
        state.roles.insert(role.id(), role.clone());
        Ok(state.definition(&role))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        state.links.retain(|(stored, _)| *stored != role_id);
        let before = state.assignments.len();
        state
            .assignments
            .retain(|assignment| assignment.role_id() != role_id);
        Ok((before - state.assignments.len()) as u64)
    }
}

#[async_trait]
impl RoleAssignmentRepository for FakeRbacStore {
    async fn assign_role(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.assignments.iter().any(|stored| {
            stored.user_id() == assignment.user_id() && stored.role_id() == assignment.role_id()
        }) {
            return Err(AppError::Conflict("role already assigned".to_owned()));
        }
        state.assignments.push(assignment);
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.assignments.len();
        state.assignments.retain(|assignment| {
            !(assignment.user_id() == user_id && assignment.role_id() == role_id)
        });
        if state.assignments.len() == before {
            return Err(AppError::NotFound("role assignment was not found".to_owned()));
        }
        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .iter()
            .filter(|assignment| assignment.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuthorizationRepository for FakeRbacStore {
    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .iter()
            .filter(|assignment| assignment.user_id() == user_id)
            .filter_map(|assignment| {
                let role = state.roles.get(&assignment.role_id())?;
                let definition = state.definition(role);
                Some(RoleGrant {
                    role_id: role.id(),
                    role_name: role.name().to_string(),
                    organization_id: role.organization_id(),
                    role_is_active: role.is_active(),
                    expires_at: assignment.expires_at(),
                    permissions: definition
                        .permissions
                        .iter()
                        .map(GrantedPermission::from)
                        .collect(),
                })
            })
            .collect())
    }
}

pub(crate) fn member(organization_id: OrganizationId) -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), "+15550100", Some(organization_id))
}
