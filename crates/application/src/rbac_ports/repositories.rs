use async_trait::async_trait;

use clinica_core::{AppResult, OrganizationId, UserId};
use clinica_domain::{
    Permission, PermissionDefinition, PermissionId, Role, RoleGrant, RoleId, UserRoleAssignment,
};

use super::inputs::RoleDefinition;

/// Repository port for the permission catalog rows.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Inserts catalog entries whose name is not stored yet and returns how
    /// many were inserted. Existing names are skipped silently.
    async fn ensure_permissions(&self, definitions: &[PermissionDefinition]) -> AppResult<usize>;

    /// Lists all stored permissions.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;
}

/// Repository port for roles and their permission links.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists organization roles with their permissions, sorted by name.
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<RoleDefinition>>;

    /// Finds a role with its permissions.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>>;

    /// Finds a role by its name inside an organization.
    async fn find_role_by_name(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> AppResult<Option<Role>>;

    /// Stores a role and links permissions in one atomic unit.
    ///
    /// Fails with `Conflict` when the name is taken in the organization.
    async fn create_role(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
    ) -> AppResult<RoleDefinition>;

    /// Overwrites a role and, when given, replaces its permission links in
    /// one atomic unit.
    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<RoleDefinition>;

    /// Deletes a role with its permission links and user assignments.
    /// Returns the number of removed user assignments.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<u64>;
}

/// Repository port for user role assignments.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Stores an assignment. Fails with `Conflict` if the pair exists.
    async fn assign_role(&self, assignment: UserRoleAssignment) -> AppResult<()>;

    /// Removes an assignment. Fails with `NotFound` if the pair is missing.
    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Lists assignments held by a user.
    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>>;
}

/// Read port used to resolve principals.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists every assignment of a user joined to its role and permissions.
    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>>;
}
