use chrono::{DateTime, Utc};
use clinica_core::UserId;
use serde::{Deserialize, Serialize};

use crate::role::RoleId;

/// Grant of one role to one user. `(user_id, role_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    user_id: UserId,
    role_id: RoleId,
    assigned_by: UserId,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRoleAssignment {
    /// Creates an assignment recorded now.
    #[must_use]
    pub fn new(
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self::restore(user_id, role_id, assigned_by, expires_at, Utc::now())
    }

    /// Rebuilds an assignment from stored values.
    #[must_use]
    pub fn restore(
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            role_id,
            assigned_by,
            expires_at,
            created_at,
        }
    }

    /// Returns the assigned user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the user who made the assignment.
    #[must_use]
    pub fn assigned_by(&self) -> UserId {
        self.assigned_by
    }

    /// Returns the optional expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
