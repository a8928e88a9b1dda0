use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use clinica_core::{AuthenticatedUser, OrganizationId, UserId};
use serde::Serialize;

use crate::permission::{Permission, PermissionKey};
use crate::role::RoleId;

/// Permission held by a principal, reduced to what decisions need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantedPermission {
    name: String,
    key: PermissionKey,
}

impl GrantedPermission {
    /// Creates a granted permission.
    #[must_use]
    pub fn new(name: impl Into<String>, key: PermissionKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }

    /// Returns the permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the `resource:action` key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }
}

impl From<&Permission> for GrantedPermission {
    fn from(value: &Permission) -> Self {
        Self::new(value.name(), value.key().clone())
    }
}

/// One assignment joined to its role and the role's permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// Assigned role.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Organization that owns the role.
    pub organization_id: OrganizationId,
    /// Whether the role is active.
    pub role_is_active: bool,
    /// Assignment expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Permissions linked to the role.
    pub permissions: Vec<GrantedPermission>,
}

impl RoleGrant {
    fn is_effective_in(
        &self,
        organization_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> bool {
        self.role_is_active
            && organization_id == Some(self.organization_id)
            && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Role names and deduplicated permissions of a user at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedGrants {
    /// Sorted role names.
    pub roles: Vec<String>,
    /// Permissions sorted and deduplicated by `resource:action`.
    pub permissions: Vec<GrantedPermission>,
}

/// Flattens role grants into role names and a permission set keyed by
/// `resource:action`.
///
/// Only roles owned by `organization_id` count. Grants of inactive roles,
/// grants of other organizations' roles and assignments expired at `now`
/// contribute nothing. A caller without an organization therefore gets no
/// grants at all.
#[must_use]
pub fn flatten_role_grants(
    grants: &[RoleGrant],
    organization_id: Option<OrganizationId>,
    now: DateTime<Utc>,
) -> FlattenedGrants {
    let mut roles = BTreeSet::new();
    let mut permissions: BTreeMap<PermissionKey, GrantedPermission> = BTreeMap::new();

    for grant in grants
        .iter()
        .filter(|grant| grant.is_effective_in(organization_id, now))
    {
        roles.insert(grant.role_name.clone());
        for permission in &grant.permissions {
            permissions
                .entry(permission.key().clone())
                .or_insert_with(|| permission.clone());
        }
    }

    FlattenedGrants {
        roles: roles.into_iter().collect(),
        permissions: permissions.into_values().collect(),
    }
}

/// Request-scoped projection of who is asking. Built fresh for each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    user_id: UserId,
    organization_id: Option<OrganizationId>,
    is_super_admin: bool,
    is_active: bool,
    roles: Vec<String>,
    permissions: Vec<GrantedPermission>,
}

impl Principal {
    /// Assembles a principal from a verified identity and its flattened grants.
    #[must_use]
    pub fn new(identity: &AuthenticatedUser, grants: FlattenedGrants) -> Self {
        Self {
            user_id: identity.user_id(),
            organization_id: identity.organization_id(),
            is_super_admin: identity.is_super_admin(),
            is_active: identity.is_active(),
            roles: grants.roles,
            permissions: grants.permissions,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the organization the principal belongs to.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns whether the principal bypasses tenant and permission checks.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns effective role names.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns effective permissions.
    #[must_use]
    pub fn permissions(&self) -> &[GrantedPermission] {
        &self.permissions
    }
}
