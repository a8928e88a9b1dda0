use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use clinica_application::{RoleDefinition, RoleRepository};
use clinica_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use clinica_domain::{Permission, PermissionId, Role, RoleId};

use crate::postgres_permission_repository::PermissionRow;


/// PostgreSQL-backed repository for organization roles.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    name: String,
    description: String,
    is_system: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let name = NonEmptyString::new(row.name).map_err(|error| {
            AppError::Internal(format!("invalid stored name for role '{}': {error}", row.id))
        })?;

        Ok(Role::restore(
            RoleId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            name,
            row.description,
            row.is_system,
            row.is_active,
            row.created_at,
        ))
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: uuid::Uuid,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, organization_id: OrganizationId) -> AppResult<Vec<RoleDefinition>> {
        let roles = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, organization_id, name, description, is_system, is_active, created_at
            FROM rbac_roles
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        let links = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT
                links.role_id,
                permissions.id,
                permissions.name,
                permissions.resource,
                permissions.action,
                permissions.description
            FROM rbac_role_permissions AS links
            INNER JOIN rbac_roles AS roles
                ON roles.id = links.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = links.permission_id
            WHERE roles.organization_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role permissions: {error}")))?;

        aggregate_roles(roles, links)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire connection: {error}"))
        })?;

        let Some(row) = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, organization_id, name, description, is_system, is_active, created_at
            FROM rbac_roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        else {
            return Ok(None);
        };

        let role = Role::try_from(row)?;
        let permissions = role_permissions(&mut connection, role_id).await?;
        Ok(Some(RoleDefinition { role, permissions }))
    }

    async fn find_role_by_name(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, organization_id, name, description, is_system, is_active, created_at
            FROM rbac_roles
            WHERE organization_id = $1 AND name = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    async fn create_role(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
    ) -> AppResult<RoleDefinition> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO rbac_roles
                (id, organization_id, name, description, is_system, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.organization_id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.is_system())
        .bind(role.is_active())
        .bind(role.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, &role, "create"))?;

        link_permissions(&mut transaction, role.id(), permission_ids).await?;
        let permissions = role_permissions(&mut transaction, role.id()).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(RoleDefinition { role, permissions })
    }

    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<RoleDefinition> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_roles
            SET name = $2, description = $3, is_system = $4, is_active = $5
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.is_system())
        .bind(role.is_active())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, &role, "update"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        if let Some(permission_ids) = permission_ids {
            sqlx::query("DELETE FROM rbac_role_permissions WHERE role_id = $1")
                .bind(role.id().as_uuid())
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to clear role permissions: {error}"))
                })?;
            link_permissions(&mut transaction, role.id(), permission_ids).await?;
        }
        let permissions = role_permissions(&mut transaction, role.id()).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(RoleDefinition { role, permissions })
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<u64> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let revoked = sqlx::query("DELETE FROM rbac_user_roles WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to revoke role assignments: {error}"))
            })?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM rbac_roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(revoked)
    }
}

async fn link_permissions(
    connection: &mut PgConnection,
    role_id: RoleId,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    for permission_id in permission_ids {
        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!("permission '{permission_id}' was not found"));
            }
            AppError::Internal(format!("failed to link role permission: {error}"))
        })?;
    }

    Ok(())
}

async fn role_permissions(
    connection: &mut PgConnection,
    role_id: RoleId,
) -> AppResult<Vec<Permission>> {
    sqlx::query_as::<_, PermissionRow>(
        r#"
        SELECT permissions.id, permissions.name, permissions.resource, permissions.action,
            permissions.description
        FROM rbac_role_permissions AS links
        INNER JOIN rbac_permissions AS permissions
            ON permissions.id = links.permission_id
        WHERE links.role_id = $1
        ORDER BY permissions.name
        "#,
    )
    .bind(role_id.as_uuid())
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load role permissions: {error}")))?
    .into_iter()
    .map(Permission::try_from)
    .collect()
}

fn aggregate_roles(
    roles: Vec<RoleRow>,
    links: Vec<RolePermissionRow>,
) -> AppResult<Vec<RoleDefinition>> {
    let mut permissions_by_role: HashMap<uuid::Uuid, Vec<Permission>> = HashMap::new();
    for link in links {
        permissions_by_role
            .entry(link.role_id)
            .or_default()
            .push(Permission::try_from(link.permission)?);
    }

    roles
        .into_iter()
        .map(|row| {
            let permissions = permissions_by_role.remove(&row.id).unwrap_or_default();
            Ok(RoleDefinition {
                role: Role::try_from(row)?,
                permissions,
            })
        })
        .collect()
}

fn map_role_conflict(error: sqlx::Error, role: &Role, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "role '{}' already exists in organization '{}'",
            role.name(),
            role.organization_id()
        ));
    }

    AppError::Internal(format!("failed to {operation} role: {error}"))
}
