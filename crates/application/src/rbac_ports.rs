mod inputs;
mod repositories;

pub use inputs::{
    AssignRoleInput, CreateRoleInput, RoleDefinition, RoleDeletion, SeedReport, SeededRole,
    UpdateRoleInput,
};
pub use repositories::{
    AuthorizationRepository, PermissionRepository, RoleAssignmentRepository, RoleRepository,
};
