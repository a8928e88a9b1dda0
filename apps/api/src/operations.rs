//! Admission requirements of every protected route.

use clinica_domain::{OperationDescriptor, PermissionAction, resources};

pub const CURRENT_ACCESS: OperationDescriptor = OperationDescriptor::authenticated("current_access");
pub const CHECK_ACCESS: OperationDescriptor = OperationDescriptor::authenticated("check_access");

pub const LIST_PERMISSIONS: OperationDescriptor =
    OperationDescriptor::unscoped("list_permissions", resources::ROLES, PermissionAction::Read);
pub const LIST_ROLE_TEMPLATES: OperationDescriptor = OperationDescriptor::unscoped(
    "list_role_templates",
    resources::ROLES,
    PermissionAction::Read,
);

pub const LIST_ROLES: OperationDescriptor =
    OperationDescriptor::tenant_scoped("list_roles", resources::ROLES, PermissionAction::Read);
pub const GET_ROLE: OperationDescriptor =
    OperationDescriptor::tenant_scoped("get_role", resources::ROLES, PermissionAction::Read);
pub const CREATE_ROLE: OperationDescriptor =
    OperationDescriptor::tenant_scoped("create_role", resources::ROLES, PermissionAction::Create);
pub const UPDATE_ROLE: OperationDescriptor =
    OperationDescriptor::tenant_scoped("update_role", resources::ROLES, PermissionAction::Update);
pub const DELETE_ROLE: OperationDescriptor =
    OperationDescriptor::tenant_scoped("delete_role", resources::ROLES, PermissionAction::Delete);

pub const ASSIGN_ROLE: OperationDescriptor =
    OperationDescriptor::tenant_scoped("assign_role", resources::ROLES, PermissionAction::Update);
pub const REMOVE_ROLE_ASSIGNMENT: OperationDescriptor = OperationDescriptor::tenant_scoped(
    "remove_role_assignment",
    resources::ROLES,
    PermissionAction::Update,
);
pub const LIST_USER_ROLES: OperationDescriptor =
    OperationDescriptor::tenant_scoped("list_user_roles", resources::ROLES, PermissionAction::Read);

pub const SEED_ORGANIZATION: OperationDescriptor = OperationDescriptor::unscoped(
    "seed_organization",
    resources::ORGANIZATIONS,
    PermissionAction::Manage,
);
