use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clinica_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::InvalidInput(format!("invalid role id: {error}")))
    }
}

/// Organization-scoped role. `(organization_id, name)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    organization_id: OrganizationId,
    name: NonEmptyString,
    description: String,
    is_system: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// Requested changes to a role. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    /// New role name.
    pub name: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New system flag.
    pub is_system: Option<bool>,
}

impl Role {
    /// Creates an active custom role.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: NonEmptyString,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: RoleId::new(),
            organization_id,
            name,
            description: description.into(),
            is_system: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Creates an active system role. Only seeding creates these.
    #[must_use]
    pub fn system(
        organization_id: OrganizationId,
        name: NonEmptyString,
        description: impl Into<String>,
    ) -> Self {
        Self {
            is_system: true,
            ..Self::new(organization_id, name, description)
        }
    }

    /// Rebuilds a role from stored values.
    #[must_use]
    pub fn restore(
        id: RoleId,
        organization_id: OrganizationId,
        name: NonEmptyString,
        description: impl Into<String>,
        is_system: bool,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id,
            name,
            description: description.into(),
            is_system,
            is_active,
            created_at,
        }
    }

    /// Returns the role with `changes` applied.
    ///
    /// System roles keep their name and system flag; only description and the
    /// active flag may change. The system flag is never granted after creation.
    pub fn apply(&self, changes: &RoleChanges) -> AppResult<Self> {
        if self.is_system {
            if let Some(name) = &changes.name
                && name != &self.name
            {
                return Err(AppError::Forbidden(format!(
                    "system role '{}' cannot be renamed",
                    self.name
                )));
            }

            if changes.is_system == Some(false) {
                return Err(AppError::Forbidden(format!(
                    "system role '{}' cannot be converted to a custom role",
                    self.name
                )));
            }
        } else if changes.is_system == Some(true) {
            return Err(AppError::Forbidden(format!(
                "role '{}' cannot be promoted to a system role",
                self.name
            )));
        }

        let mut updated = self.clone();
        if let Some(name) = &changes.name {
            updated.name = name.clone();
        }
        if let Some(description) = &changes.description {
            updated.description = description.clone();
        }
        if let Some(is_active) = changes.is_active {
            updated.is_active = is_active;
        }

        Ok(updated)
    }

    /// Fails when the role is a system role.
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be deleted",
                self.name
            )));
        }

        Ok(())
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns whether seeding created the role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns whether the role currently grants its permissions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
