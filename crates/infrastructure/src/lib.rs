//! Infrastructure adapters for role-based access control ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_store;
mod postgres_authorization_repository;
mod postgres_permission_repository;
mod postgres_role_assignment_repository;
mod postgres_role_repository;

pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_role_assignment_repository::PostgresRoleAssignmentRepository;
pub use postgres_role_repository::PostgresRoleRepository;
