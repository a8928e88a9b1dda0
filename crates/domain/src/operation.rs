use crate::permission::PermissionAction;
use crate::tenant::TenantRequirement;

/// Permission an operation checks before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredPermission {
    /// Resource name.
    pub resource: &'static str,
    /// Requested action.
    pub action: PermissionAction,
}

/// Registration metadata of an inbound operation, read at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Stable operation name used in logs.
    pub name: &'static str,
    /// Whether the operation needs an organization.
    pub tenant: TenantRequirement,
    /// Permission checked after the tenant requirement, if any.
    pub permission: Option<RequiredPermission>,
}

impl OperationDescriptor {
    /// Describes an organization-scoped operation guarded by a permission.
    #[must_use]
    pub const fn tenant_scoped(
        name: &'static str,
        resource: &'static str,
        action: PermissionAction,
    ) -> Self {
        Self {
            name,
            tenant: TenantRequirement::Required,
            permission: Some(RequiredPermission { resource, action }),
        }
    }

    /// Describes an operation without tenant scoping guarded by a permission.
    #[must_use]
    pub const fn unscoped(
        name: &'static str,
        resource: &'static str,
        action: PermissionAction,
    ) -> Self {
        Self {
            name,
            tenant: TenantRequirement::NotRequired,
            permission: Some(RequiredPermission { resource, action }),
        }
    }

    /// Describes an operation any authenticated principal may run.
    #[must_use]
    pub const fn authenticated(name: &'static str) -> Self {
        Self {
            name,
            tenant: TenantRequirement::NotRequired,
            permission: None,
        }
    }
}
