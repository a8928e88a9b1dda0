use std::sync::Arc;

use clinica_application::{AuthorizationService, RoleSeedingService, RoleService};
use clinica_infrastructure::{
    PostgresAuthorizationRepository, PostgresPermissionRepository,
    PostgresRoleAssignmentRepository, PostgresRoleRepository,
};
use sqlx::PgPool;

use crate::state::AppState;

pub fn build_app_state(pool: PgPool) -> AppState {
    let permission_repository = Arc::new(PostgresPermissionRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool.clone()));
    let assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pool.clone()));
    let authorization_repository = Arc::new(PostgresAuthorizationRepository::new(pool));

    AppState {
        authorization_service: AuthorizationService::new(authorization_repository),
        role_service: RoleService::new(
            permission_repository.clone(),
            role_repository.clone(),
            assignment_repository,
        ),
        role_seeding_service: RoleSeedingService::new(permission_repository, role_repository),
    }
}
