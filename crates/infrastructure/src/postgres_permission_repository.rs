use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use clinica_application::PermissionRepository;
use clinica_core::{AppError, AppResult};
use clinica_domain::{
    Permission, PermissionAction, PermissionDefinition, PermissionId, PermissionKey,
};

/// PostgreSQL-backed repository for catalog permissions.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) name: String,
    pub(crate) resource: String,
    pub(crate) action: String,
    pub(crate) description: String,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let action = row.action.parse::<PermissionAction>().map_err(|error| {
            AppError::Internal(format!(
                "invalid stored action '{}' for permission '{}': {error}",
                row.action, row.name
            ))
        })?;

        Ok(Permission::restore(
            PermissionId::from_uuid(row.id),
            row.name,
            PermissionKey::new(row.resource, action),
            row.description,
        ))
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn ensure_permissions(&self, definitions: &[PermissionDefinition]) -> AppResult<usize> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut created = 0;
        for definition in definitions {
            let rows_affected = sqlx::query(
                r#"
                INSERT INTO rbac_permissions (id, name, resource, action, description)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(PermissionId::new().as_uuid())
            .bind(definition.name)
            .bind(definition.resource)
            .bind(definition.action.as_str())
            .bind(definition.description)
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_permission_conflict(error, definition))?
            .rows_affected();

            created += usize::from(rows_affected > 0);
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(created)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, resource, action, description
            FROM rbac_permissions
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }
}

fn map_permission_conflict(error: sqlx::Error, definition: &PermissionDefinition) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "permission key '{}' is already used by another name",
            definition.key()
        ));
    }

    AppError::Internal(format!(
        "failed to persist permission '{}': {error}",
        definition.name
    ))
}
