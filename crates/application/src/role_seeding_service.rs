use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use clinica_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use clinica_domain::{PermissionId, Role, RoleTemplate, catalog_permissions, role_templates};

use crate::{PermissionRepository, RoleRepository, SeedReport, SeededRole};


/// Materializes the permission catalog and template roles for organizations.
#[derive(Clone)]
pub struct RoleSeedingService {
    permission_repository: Arc<dyn PermissionRepository>,
    role_repository: Arc<dyn RoleRepository>,
}

impl RoleSeedingService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        role_repository: Arc<dyn RoleRepository>,
    ) -> Self {
        Self {
            permission_repository,
            role_repository,
        }
    }

    /// Stores catalog permissions that are missing. Returns how many were added.
    pub async fn seed_permission_catalog(&self) -> AppResult<usize> {
        let created = self
            .permission_repository
            .ensure_permissions(catalog_permissions())
            .await?;

        if created > 0 {
            info!(created, "permission catalog synchronized");
        }
        Ok(created)
    }

    /// Seeds template roles for an organization. Safe to run repeatedly.
    ///
    /// Templates whose name already exists in the organization are skipped,
    /// including when a concurrent run creates the role first.
    pub async fn seed_organization(&self, organization_id: OrganizationId) -> AppResult<SeedReport> {
        let permissions_created = self.seed_permission_catalog().await?;
        let permission_ids: HashMap<String, PermissionId> = self
            .permission_repository
            .list_permissions()
            .await?
            .into_iter()
            .map(|permission| (permission.name().to_owned(), permission.id()))
            .collect();

        let mut roles = Vec::with_capacity(role_templates().len());
        for template in role_templates() {
            roles.push(
                self.seed_template(organization_id, template, &permission_ids)
                    .await?,
            );
        }

        info!(
            organization_id = %organization_id,
            permissions_created,
            roles_created = roles.iter().filter(|role| role.created).count(),
            "organization seeded"
        );
        Ok(SeedReport {
            organization_id,
            permissions_created,
            roles,
        })
    }

    async fn seed_template(
        &self,
        organization_id: OrganizationId,
        template: &RoleTemplate,
        permission_ids: &HashMap<String, PermissionId>,
    ) -> AppResult<SeededRole> {
        let skipped = SeededRole {
            name: template.name.to_owned(),
            created: false,
            permissions_assigned: 0,
        };

        if self
            .role_repository
            .find_role_by_name(organization_id, template.name)
            .await?
            .is_some()
        {
            return Ok(skipped);
        }

        let template_permission_ids = template
            .permission_names()
            .into_iter()
            .map(|name| {
                permission_ids.get(name).copied().ok_or_else(|| {
                    AppError::Internal(format!(
                        "catalog permission '{name}' is missing from the store"
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let role = Role::system(
            organization_id,
            NonEmptyString::new(template.name)?,
            template.description,
        );

        match self
            .role_repository
            .create_role(role, &template_permission_ids)
            .await
        {
            Ok(created) => Ok(SeededRole {
                name: template.name.to_owned(),
                created: true,
                permissions_assigned: created.permissions.len(),
            }),
            Err(AppError::Conflict(_)) => {
                debug!(
                    organization_id = %organization_id,
                    role_name = template.name,
                    "template role created concurrently"
                );
                Ok(skipped)
            }
            Err(error) => Err(error),
        }
    }
}
