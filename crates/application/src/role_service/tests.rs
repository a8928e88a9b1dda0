use std::sync::Arc;

use chrono::{Duration, Utc};

use clinica_core::{AppError, OrganizationId, UserId};
use clinica_domain::RoleId;

use crate::test_support::FakeRbacStore;
use crate::{
    AssignRoleInput, CreateRoleInput, RoleDefinition, RoleSeedingService, RoleService,
    UpdateRoleInput,
};

use super::*;

async fn seeded_service(organization_id: OrganizationId) -> (RoleService, Arc<FakeRbacStore>) {
    let store = Arc::new(FakeRbacStore::default());
    let seeding = RoleSeedingService::new(store.clone(), store.clone());
    let report = seeding.seed_organization(organization_id).await;
    assert!(report.is_ok());

    (
        RoleService::new(store.clone(), store.clone(), store.clone()),
        store,
    )
}

fn create_input(organization_id: OrganizationId, name: &str, permissions: &[&str]) -> CreateRoleInput {
    CreateRoleInput {
        organization_id,
        name: name.to_owned(),
        description: String::new(),
        permission_names: permissions.iter().map(|name| (*name).to_owned()).collect(),
    }
}

async fn system_role(service: &RoleService, organization_id: OrganizationId, name: &str) -> RoleDefinition {
    let roles = service.list_roles(organization_id).await.unwrap_or_default();
    match roles.into_iter().find(|role| role.role.name().as_str() == name) {
        Some(role) => role,
        None => panic!("seeded role '{name}' is missing"),
    }
}

#[tokio::test]
async fn create_role_links_deduplicated_permissions() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;

    let result = service
        .create_role(create_input(
            organization_id,
            "Nurse",
            &["READ_PATIENTS", "MANAGE_VISITS", "READ_PATIENTS"],
        ))
        .await;

    let Ok(role) = result else {
        panic!("role creation should succeed");
    };
    assert!(!role.role.is_system());
    assert_eq!(role.permissions.len(), 2);
}

#[tokio::test]
async fn duplicate_name_conflicts_only_within_organization() {
    let organization_a = OrganizationId::new();
    let organization_b = OrganizationId::new();
    let (service, _) = seeded_service(organization_a).await;

    let first = service
        .create_role(create_input(organization_a, "Reception", &["READ_PATIENTS"]))
        .await;
    let second = service
        .create_role(create_input(organization_a, "Reception", &["READ_PATIENTS"]))
        .await;
    let other_organization = service
        .create_role(create_input(organization_b, "Reception", &["READ_PATIENTS"]))
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert!(other_organization.is_ok());
}

#[tokio::test]
async fn unknown_permission_name_is_invalid_input() {
    let organization_id = OrganizationId::new();
    let (service, store) = seeded_service(organization_id).await;
    let roles_before = store.role_count(organization_id).await;

    let result = service
        .create_role(create_input(organization_id, "Nurse", &["MANAGE_SPACESHIPS"]))
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(store.role_count(organization_id).await, roles_before);
}

#[tokio::test]
async fn system_role_rename_is_forbidden_and_leaves_role_unchanged() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;

    let rename = service
        .update_role(
            doctor.role.id(),
            UpdateRoleInput {
                name: Some("Physician".to_owned()),
                ..UpdateRoleInput::default()
            },
        )
        .await;
    let demote = service
        .update_role(
            doctor.role.id(),
            UpdateRoleInput {
                is_system: Some(false),
                ..UpdateRoleInput::default()
            },
        )
        .await;

    assert!(matches!(rename, Err(AppError::Forbidden(_))));
    assert!(matches!(demote, Err(AppError::Forbidden(_))));
    let stored = service.get_role(doctor.role.id()).await;
    assert!(matches!(stored, Ok(ref role) if role == &doctor));
}

#[tokio::test]
async fn system_role_description_and_active_flag_are_updatable() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;

    let result = service
        .update_role(
            doctor.role.id(),
            UpdateRoleInput {
                description: Some("Attending physicians".to_owned()),
                is_active: Some(false),
                ..UpdateRoleInput::default()
            },
        )
        .await;

    let Ok(updated) = result else {
        panic!("system role update should succeed");
    };
    assert_eq!(updated.role.description(), "Attending physicians");
    assert!(!updated.role.is_active());
    assert_eq!(updated.permissions, doctor.permissions);
}

#[tokio::test]
async fn permission_list_replaces_whole_set() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let created = service
        .create_role(create_input(
            organization_id,
            "Nurse",
            &["READ_PATIENTS", "READ_VISITS"],
        ))
        .await;
    let Ok(created) = created else {
        panic!("role creation should succeed");
    };

    let result = service
        .update_role(
            created.role.id(),
            UpdateRoleInput {
                permission_names: Some(vec!["MANAGE_APPOINTMENTS".to_owned()]),
                ..UpdateRoleInput::default()
            },
        )
        .await;

    let names: Vec<String> = result
        .map(|role| {
            role.permissions
                .iter()
                .map(|permission| permission.name().to_owned())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(names, vec!["MANAGE_APPOINTMENTS"]);
}

#[tokio::test]
async fn rename_onto_existing_name_conflicts() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let created = service
        .create_role(create_input(organization_id, "Nurse", &[]))
        .await;
    let Ok(created) = created else {
        panic!("role creation should succeed");
    };

    let result = service
        .update_role(
            created.role.id(),
            UpdateRoleInput {
                name: Some("Doctor".to_owned()),
                ..UpdateRoleInput::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn update_of_missing_role_is_not_found() {
    let (service, _) = seeded_service(OrganizationId::new()).await;

    let result = service
        .update_role(RoleId::new(), UpdateRoleInput::default())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn system_role_deletion_is_forbidden() {
    let organization_id = OrganizationId::new();
    let (service, store) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;
    let links_before = store.link_count().await;

    let result = service.delete_role(doctor.role.id()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(service.get_role(doctor.role.id()).await.is_ok());
    assert_eq!(store.link_count().await, links_before);
}

#[tokio::test]
async fn custom_role_deletion_cascades_assignments() {
    let organization_id = OrganizationId::new();
    let (service, store) = seeded_service(organization_id).await;
    let created = service
        .create_role(create_input(organization_id, "Temp", &["READ_PATIENTS"]))
        .await;
    let Ok(created) = created else {
        panic!("role creation should succeed");
    };
    let assigned = service
        .assign_user_role(AssignRoleInput {
            user_id: UserId::new(),
            role_id: created.role.id(),
            assigned_by: UserId::new(),
            expires_at: None,
        })
        .await;
    assert!(assigned.is_ok());

    let result = service.delete_role(created.role.id()).await;

    assert!(matches!(result, Ok(ref deletion) if deletion.revoked_assignments == 1));
    assert_eq!(store.assignment_count().await, 0);
    assert!(matches!(
        service.delete_role(created.role.id()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn duplicate_assignment_conflicts_and_missing_removal_is_not_found() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;
    let input = AssignRoleInput {
        user_id: UserId::new(),
        role_id: doctor.role.id(),
        assigned_by: UserId::new(),
        expires_at: None,
    };

    assert!(service.assign_user_role(input.clone()).await.is_ok());
    assert!(matches!(
        service.assign_user_role(input.clone()).await,
        Err(AppError::Conflict(_))
    ));
    assert!(
        service
            .remove_user_role(input.user_id, input.role_id)
            .await
            .is_ok()
    );
    assert!(matches!(
        service.remove_user_role(input.user_id, input.role_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn assignment_rejects_past_expiry_and_unknown_role() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;

    let expired = service
        .assign_user_role(AssignRoleInput {
            user_id: UserId::new(),
            role_id: doctor.role.id(),
            assigned_by: UserId::new(),
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        })
        .await;
    let unknown = service
        .assign_user_role(AssignRoleInput {
            user_id: UserId::new(),
            role_id: RoleId::new(),
            assigned_by: UserId::new(),
            expires_at: None,
        })
        .await;

    assert!(matches!(expired, Err(AppError::InvalidInput(_))));
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn roles_outside_tenant_scope_are_hidden() {
    let organization_id = OrganizationId::new();
    let (service, _) = seeded_service(organization_id).await;
    let doctor = system_role(&service, organization_id, "Doctor").await;

    let outsider = clinica_domain::Principal::new(
        &crate::test_support::member(OrganizationId::new()),
        clinica_domain::FlattenedGrants::default(),
    );
    let context = TenantContext::require(&outsider, clinica_domain::TenantRequirement::Required);
    let Ok(context) = context else {
        panic!("member should pass tenant checks");
    };

    let result = service.get_role_in_scope(&context, doctor.role.id()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn user_roles_are_filtered_by_tenant_scope() {
    let home = OrganizationId::new();
    let other = OrganizationId::new();
    let (service, store) = seeded_service(home).await;
    let seeding = RoleSeedingService::new(store.clone(), store.clone());
    assert!(seeding.seed_organization(other).await.is_ok());
    let home_doctor = system_role(&service, home, "Doctor").await;
    let other_doctor = system_role(&service, other, "Doctor").await;
    let user_id = UserId::new();
    for role_id in [home_doctor.role.id(), other_doctor.role.id()] {
        let assigned = service
            .assign_user_role(AssignRoleInput {
                user_id,
                role_id,
                assigned_by: UserId::new(),
                expires_at: None,
            })
            .await;
        assert!(assigned.is_ok());
    }
    let admin = clinica_domain::Principal::new(
        &crate::test_support::member(home),
        clinica_domain::FlattenedGrants::default(),
    );
    let Ok(context) = TenantContext::require(&admin, clinica_domain::TenantRequirement::Required)
    else {
        panic!("member should pass tenant checks");
    };

    let visible = service.list_user_roles_in_scope(&context, user_id).await;

    assert!(matches!(
        visible,
        Ok(ref assignments)
            if assignments.len() == 1 && assignments[0].role_id() == home_doctor.role.id()
    ));
    assert_eq!(service.list_user_roles(user_id).await.unwrap_or_default().len(), 2);
}
