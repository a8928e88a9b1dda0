use chrono::{DateTime, Utc};
use clinica_core::{OrganizationId, UserId};
use clinica_domain::{Permission, Role, RoleId};

/// Role returned to callers together with its linked permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stored role.
    pub role: Role,
    /// Linked permissions sorted by name.
    pub permissions: Vec<Permission>,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Unique role name in organization scope.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Catalog permission names to link. Duplicates are ignored.
    pub permission_names: Vec<String>,
}

/// Input payload for role updates. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New system flag.
    pub is_system: Option<bool>,
    /// Full replacement of the linked permissions.
    pub permission_names: Option<Vec<String>>,
}

/// Input payload for assigning a role to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// User receiving the role.
    pub user_id: UserId,
    /// Role being granted.
    pub role_id: RoleId,
    /// User performing the assignment.
    pub assigned_by: UserId,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of deleting a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDeletion {
    /// Deleted role.
    pub role_id: RoleId,
    /// Name the role had.
    pub role_name: String,
    /// User assignments removed along with the role.
    pub revoked_assignments: u64,
}

/// Outcome of seeding one template role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRole {
    /// Template role name.
    pub name: String,
    /// Whether this run created the role.
    pub created: bool,
    /// Permissions linked by this run.
    pub permissions_assigned: usize,
}

/// Outcome of seeding an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Seeded organization.
    pub organization_id: OrganizationId,
    /// Catalog permissions inserted by this run.
    pub permissions_created: usize,
    /// Per-template outcome in seeding order.
    pub roles: Vec<SeededRole>,
}
