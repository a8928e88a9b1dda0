//! Application services and ports for role-based access control.

#![forbid(unsafe_code)]

mod authorization_service;
mod rbac_ports;
mod role_seeding_service;
mod role_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::AuthorizationService;
pub use rbac_ports::{
    AssignRoleInput, AuthorizationRepository, CreateRoleInput, PermissionRepository,
    RoleAssignmentRepository, RoleDefinition, RoleDeletion, RoleRepository, SeedReport,
    SeededRole, UpdateRoleInput,
};
pub use role_seeding_service::RoleSeedingService;
pub use role_service::RoleService;
