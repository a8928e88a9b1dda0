use std::sync::Arc;

use chrono::{Duration, Utc};

use clinica_application::{
    AssignRoleInput, AuthorizationRepository, AuthorizationService, CreateRoleInput,
    PermissionRepository, RoleAssignmentRepository, RoleRepository, RoleSeedingService,
    RoleService,
};
use clinica_core::{AppError, AuthenticatedUser, NonEmptyString, OrganizationId, UserId};
use clinica_domain::{
    OperationDescriptor, PermissionAction, PermissionId, Role, UserRoleAssignment,
    catalog_permissions, resources, role_templates,
};

use super::InMemoryRbacStore;

struct Services {
    store: Arc<InMemoryRbacStore>,
    seeding: RoleSeedingService,
    roles: RoleService,
    authorization: AuthorizationService,
}

fn services() -> Services {
    let store = Arc::new(InMemoryRbacStore::new());
    Services {
        seeding: RoleSeedingService::new(store.clone(), store.clone()),
        roles: RoleService::new(store.clone(), store.clone(), store.clone()),
        authorization: AuthorizationService::new(store.clone()),
        store,
    }
}

fn role_name(value: &str) -> NonEmptyString {
    match NonEmptyString::new(value) {
        Ok(name) => name,
        Err(error) => panic!("invalid role name in test: {error}"),
    }
}

#[tokio::test]
async fn ensure_permissions_skips_existing_names() {
    let store = InMemoryRbacStore::new();

    let first = store.ensure_permissions(catalog_permissions()).await;
    let second = store.ensure_permissions(catalog_permissions()).await;

    assert!(matches!(first, Ok(count) if count == catalog_permissions().len()));
    assert!(matches!(second, Ok(0)));
    assert_eq!(
        store.list_permissions().await.map(|permissions| permissions.len()).unwrap_or_default(),
        catalog_permissions().len()
    );
}

#[tokio::test]
async fn create_role_rejects_unknown_permission_ids() {
    let store = InMemoryRbacStore::new();
    let organization_id = OrganizationId::new();
    let role = Role::new(organization_id, role_name("Nurse"), "");

    let result = store.create_role(role, &[PermissionId::new()]).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(matches!(store.list_roles(organization_id).await, Ok(roles) if roles.is_empty()));
}

#[tokio::test]
async fn role_names_are_unique_per_organization() {
    let store = InMemoryRbacStore::new();
    let organization_id = OrganizationId::new();

    let first = store
        .create_role(Role::new(organization_id, role_name("Nurse"), ""), &[])
        .await;
    let duplicate = store
        .create_role(Role::new(organization_id, role_name("Nurse"), ""), &[])
        .await;
    let elsewhere = store
        .create_role(Role::new(OrganizationId::new(), role_name("Nurse"), ""), &[])
        .await;

    assert!(first.is_ok());
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert!(elsewhere.is_ok());
}

#[tokio::test]
async fn assignment_requires_existing_role() {
    let store = InMemoryRbacStore::new();
    let orphan = UserRoleAssignment::new(
        UserId::new(),
        clinica_domain::RoleId::new(),
        UserId::new(),
        None,
    );

    let result = store.assign_role(orphan).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_role_cascades_links_and_assignments() {
    let services = services();
    let organization_id = OrganizationId::new();
    assert!(services.seeding.seed_organization(organization_id).await.is_ok());
    let created = services
        .roles
        .create_role(CreateRoleInput {
            organization_id,
            name: "Locum".to_owned(),
            description: "Temporary staff".to_owned(),
            permission_names: vec!["READ_PATIENTS".to_owned()],
        })
        .await;
    let Ok(created) = created else {
        panic!("role creation should succeed");
    };
    let holders = [UserId::new(), UserId::new()];
    for user_id in holders {
        let assigned = services
            .roles
            .assign_user_role(AssignRoleInput {
                user_id,
                role_id: created.role.id(),
                assigned_by: UserId::new(),
                expires_at: None,
            })
            .await;
        assert!(assigned.is_ok());
    }

    let deletion = services.roles.delete_role(created.role.id()).await;

    assert!(matches!(deletion, Ok(ref report) if report.revoked_assignments == 2));
    for user_id in holders {
        assert!(matches!(
            services.store.list_user_roles(user_id).await,
            Ok(assignments) if assignments.is_empty()
        ));
        assert!(matches!(
            services.store.list_role_grants_for_user(user_id).await,
            Ok(grants) if grants.is_empty()
        ));
    }
}

#[tokio::test]
async fn seeding_twice_keeps_store_unchanged() {
    let services = services();
    let organization_id = OrganizationId::new();

    assert!(services.seeding.seed_organization(organization_id).await.is_ok());
    let first = services.store.list_roles(organization_id).await.unwrap_or_default();
    let second_report = services.seeding.seed_organization(organization_id).await;
    let second = services.store.list_roles(organization_id).await.unwrap_or_default();

    assert!(matches!(second_report, Ok(ref report) if report.roles.iter().all(|role| !role.created)));
    assert_eq!(first.len(), role_templates().len());
    assert_eq!(first, second);
    let administrator = first
        .iter()
        .find(|definition| definition.role.name().as_str() == "Administrator");
    assert!(matches!(
        administrator,
        Some(definition) if definition.role.is_system()
            && definition.permissions.len() == catalog_permissions().len()
    ));
}

#[tokio::test]
async fn doctor_scenario_end_to_end() {
    let services = services();
    let organization_id = OrganizationId::new();
    assert!(services.seeding.seed_organization(organization_id).await.is_ok());
    let doctor = services
        .store
        .find_role_by_name(organization_id, "Doctor")
        .await;
    let Ok(Some(doctor)) = doctor else {
        panic!("seeded Doctor role is missing");
    };
    let identity = AuthenticatedUser::new(UserId::new(), "+15550142", Some(organization_id));
    let assigned = services
        .roles
        .assign_user_role(AssignRoleInput {
            user_id: identity.user_id(),
            role_id: doctor.id(),
            assigned_by: UserId::new(),
            expires_at: Some(Utc::now() + Duration::days(30)),
        })
        .await;
    assert!(assigned.is_ok());

    let principal = services.authorization.resolve_principal(&identity).await;
    let Ok(principal) = principal else {
        panic!("principal resolution should succeed");
    };

    assert_eq!(principal.roles(), ["Doctor".to_owned()]);
    assert!(
        services
            .authorization
            .check(&principal, resources::PATIENTS, PermissionAction::Read)
            .is_allowed()
    );
    assert!(
        services
            .authorization
            .check(&principal, resources::SERVICE_ORDERS, PermissionAction::Update)
            .is_allowed()
    );
    assert!(
        !services
            .authorization
            .check(&principal, resources::INVOICES, PermissionAction::Read)
            .is_allowed()
    );

    assert!(
        services
            .roles
            .remove_user_role(identity.user_id(), doctor.id())
            .await
            .is_ok()
    );
    let revoked = services.authorization.resolve_principal(&identity).await;
    assert!(matches!(
        revoked,
        Ok(ref principal) if !services
            .authorization
            .check(principal, resources::PATIENTS, PermissionAction::Read)
            .is_allowed()
    ));
}

#[tokio::test]
async fn foreign_role_assignment_does_not_open_the_home_organization() {
    let services = services();
    let role_owner = OrganizationId::new();
    let home = OrganizationId::new();
    assert!(services.seeding.seed_organization(role_owner).await.is_ok());
    let administrator = services
        .store
        .find_role_by_name(role_owner, "Administrator")
        .await;
    let Ok(Some(administrator)) = administrator else {
        panic!("seeded Administrator role is missing");
    };
    let identity = AuthenticatedUser::new(UserId::new(), "+15550144", Some(home));
    let assigned = services
        .roles
        .assign_user_role(AssignRoleInput {
            user_id: identity.user_id(),
            role_id: administrator.id(),
            assigned_by: UserId::new(),
            expires_at: None,
        })
        .await;
    assert!(assigned.is_ok());

    let principal = services.authorization.resolve_principal(&identity).await;
    let Ok(principal) = principal else {
        panic!("principal resolution should succeed");
    };
    let manage_roles =
        OperationDescriptor::tenant_scoped("manage_roles", resources::ROLES, PermissionAction::Manage);

    assert!(principal.roles().is_empty());
    assert!(matches!(
        services.authorization.admit(&principal, &manage_roles),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        services.store.list_role_grants_for_user(identity.user_id()).await,
        Ok(ref grants) if grants.len() == 1 && grants[0].organization_id == role_owner
    ));
}

#[tokio::test]
async fn super_admin_bypasses_every_check() {
    let services = services();
    let identity = AuthenticatedUser::new(UserId::new(), "+15550143", None).with_super_admin(true);

    let principal = services.authorization.resolve_principal(&identity).await;
    let Ok(principal) = principal else {
        panic!("principal resolution should succeed");
    };

    for action in PermissionAction::all() {
        assert!(
            services
                .authorization
                .check(&principal, resources::ORGANIZATIONS, *action)
                .is_allowed()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn grant_reads_never_see_a_half_replaced_permission_set() {
    let store = Arc::new(InMemoryRbacStore::new());
    assert!(store.ensure_permissions(catalog_permissions()).await.is_ok());
    let catalog: Vec<PermissionId> = store
        .list_permissions()
        .await
        .unwrap_or_default()
        .iter()
        .map(|permission| permission.id())
        .collect();
    let first = catalog[..2].to_vec();
    let second = catalog[2..5].to_vec();
    let role = Role::new(OrganizationId::new(), role_name("Rotating"), "");
    assert!(store.create_role(role.clone(), &first).await.is_ok());
    let user_id = UserId::new();
    let assignment = UserRoleAssignment::new(user_id, role.id(), UserId::new(), None);
    assert!(store.assign_role(assignment).await.is_ok());

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for round in 0..200 {
                let permission_ids = if round % 2 == 0 { &second } else { &first };
                if store
                    .update_role(role.clone(), Some(permission_ids.as_slice()))
                    .await
                    .is_err()
                {
                    return false;
                }
                tokio::task::yield_now().await;
            }
            true
        })
    };
    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut complete_reads = 0;
            for _ in 0..200 {
                match store.list_role_grants_for_user(user_id).await {
                    Ok(grants) if grants.len() == 1 && !grants[0].permissions.is_empty() => {
                        complete_reads += 1;
                    }
                    _ => return complete_reads,
                }
                tokio::task::yield_now().await;
            }
            complete_reads
        })
    };

    assert!(matches!(writer.await, Ok(true)));
    assert!(matches!(reader.await, Ok(200)));
}
