use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use clinica_application::AuthorizationRepository;
use clinica_core::{AppError, AppResult, OrganizationId, UserId};
use clinica_domain::{GrantedPermission, PermissionAction, PermissionKey, RoleGrant, RoleId};

/// PostgreSQL-backed repository for principal resolution.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: uuid::Uuid,
    role_name: String,
    organization_id: uuid::Uuid,
    role_is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    permission_name: Option<String>,
    resource: Option<String>,
    action: Option<String>,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.organization_id,
                roles.is_active AS role_is_active,
                user_roles.expires_at,
                permissions.name AS permission_name,
                permissions.resource,
                permissions.action
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            LEFT JOIN rbac_role_permissions AS links
                ON links.role_id = roles.id
            LEFT JOIN rbac_permissions AS permissions
                ON permissions.id = links.permission_id
            WHERE user_roles.user_id = $1
            ORDER BY roles.name, permissions.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role grants: {error}")))?;

        aggregate_grants(rows, user_id)
    }
}

fn aggregate_grants(rows: Vec<GrantRow>, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
    let mut order = Vec::new();
    let mut by_role: HashMap<uuid::Uuid, RoleGrant> = HashMap::new();

    for row in rows {
        let grant = by_role.entry(row.role_id).or_insert_with(|| {
            order.push(row.role_id);
            RoleGrant {
                role_id: RoleId::from_uuid(row.role_id),
                role_name: row.role_name.clone(),
                organization_id: OrganizationId::from_uuid(row.organization_id),
                role_is_active: row.role_is_active,
                expires_at: row.expires_at,
                permissions: Vec::new(),
            }
        });

        if let (Some(name), Some(resource), Some(action)) =
            (row.permission_name, row.resource, row.action)
        {
            let action = action.parse::<PermissionAction>().map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode permission '{name}' for user '{user_id}': {error}"
                ))
            })?;
            grant
                .permissions
                .push(GrantedPermission::new(name, PermissionKey::new(resource, action)));
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|role_id| by_role.remove(&role_id))
        .collect())
}
