use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use clinica_application::RoleAssignmentRepository;
use clinica_core::{AppError, AppResult, UserId};
use clinica_domain::{RoleId, UserRoleAssignment};

/// PostgreSQL-backed repository for user role assignments.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    user_id: uuid::Uuid,
    role_id: uuid::Uuid,
    assigned_by: uuid::Uuid,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserRoleRow> for UserRoleAssignment {
    fn from(row: UserRoleRow) -> Self {
        UserRoleAssignment::restore(
            UserId::from_uuid(row.user_id),
            RoleId::from_uuid(row.role_id),
            UserId::from_uuid(row.assigned_by),
            row.expires_at,
            row.created_at,
        )
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn assign_role(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id, assigned_by, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(assignment.user_id().as_uuid())
        .bind(assignment.role_id().as_uuid())
        .bind(assignment.assigned_by().as_uuid())
        .bind(assignment.expires_at())
        .bind(assignment.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_assignment_error(error, &assignment))?;

        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role assignment: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, assigned_by, expires_at, created_at
            FROM rbac_user_roles
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        Ok(rows.into_iter().map(UserRoleAssignment::from).collect())
    }
}

fn map_assignment_error(error: sqlx::Error, assignment: &UserRoleAssignment) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!(
                    "user '{}' already holds role '{}'",
                    assignment.user_id(),
                    assignment.role_id()
                ));
            }
            Some("23503") => {
                return AppError::NotFound(format!(
                    "role '{}' was not found",
                    assignment.role_id()
                ));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to assign role: {error}"))
}
