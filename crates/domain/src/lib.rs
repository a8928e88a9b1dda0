//! Domain entities and invariants for role-based access control.

#![forbid(unsafe_code)]

mod assignment;
mod authorization;
mod catalog;
mod operation;
mod permission;
mod principal;
mod role;
mod tenant;

pub use assignment::UserRoleAssignment;
pub use authorization::{AccessDecision, AllowReason, DenyReason, authorize};
pub use catalog::{
    RoleTemplate, TemplatePermissions, catalog_permissions, find_catalog_permission, resources,
    role_templates,
};
pub use operation::{OperationDescriptor, RequiredPermission};
pub use permission::{Permission, PermissionAction, PermissionDefinition, PermissionId, PermissionKey};
pub use principal::{FlattenedGrants, GrantedPermission, Principal, RoleGrant, flatten_role_grants};
pub use role::{Role, RoleChanges, RoleId};
pub use tenant::{ORGANIZATION_CONTEXT_REQUIRED, TenantContext, TenantRequirement, TenantScope};
