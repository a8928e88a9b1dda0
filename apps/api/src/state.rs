use clinica_application::{AuthorizationService, RoleSeedingService, RoleService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub role_service: RoleService,
    pub role_seeding_service: RoleSeedingService,
}
