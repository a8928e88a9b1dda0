use std::fmt::{Display, Formatter};
use std::str::FromStr;

use clinica_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action half of a `resource:action` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionAction {
    /// Create new records of the resource.
    Create,
    /// Read records of the resource.
    Read,
    /// Update existing records of the resource.
    Update,
    /// Delete records of the resource.
    Delete,
    /// Wildcard: implies every other action on the same resource.
    Manage,
}

impl PermissionAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Manage => "MANAGE",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionAction] = &[
            PermissionAction::Create,
            PermissionAction::Read,
            PermissionAction::Update,
            PermissionAction::Delete,
            PermissionAction::Manage,
        ];

        ALL
    }

    /// Returns whether holding this action satisfies a request for `requested`.
    #[must_use]
    pub fn satisfies(&self, requested: Self) -> bool {
        *self == requested || *self == Self::Manage
    }

    /// Parses a transport value into an action.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for PermissionAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("unknown permission action '{value}'")))
    }
}

impl Display for PermissionAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Deduplication key of a permission: `resource:action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    resource: String,
    action: PermissionAction,
}

impl PermissionKey {
    /// Creates a key from a resource name and action.
    #[must_use]
    pub fn new(resource: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            resource: resource.into(),
            action,
        }
    }

    /// Returns the resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action.
    #[must_use]
    pub fn action(&self) -> PermissionAction {
        self.action
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource, self.action)
    }
}

/// Stable permission row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
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

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Compiled-in catalog entry describing one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDefinition {
    /// Globally unique permission name, e.g. `MANAGE_PATIENTS`.
    pub name: &'static str,
    /// Resource the permission applies to.
    pub resource: &'static str,
    /// Action granted on the resource.
    pub action: PermissionAction,
    /// Human-readable description.
    pub description: &'static str,
}

impl PermissionDefinition {
    /// Creates a catalog entry.
    #[must_use]
    pub const fn new(
        name: &'static str,
        resource: &'static str,
        action: PermissionAction,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            resource,
            action,
            description,
        }
    }

    /// Returns the `resource:action` key.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(self.resource, self.action)
    }
}

/// Persisted permission. Created once by seeding and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: String,
    key: PermissionKey,
    description: String,
}

impl Permission {
    /// Materializes a new permission row from a catalog entry.
    #[must_use]
    pub fn from_definition(definition: &PermissionDefinition) -> Self {
        Self {
            id: PermissionId::new(),
            name: definition.name.to_owned(),
            key: definition.key(),
            description: definition.description.to_owned(),
        }
    }

    /// Rebuilds a permission from stored values.
    #[must_use]
    pub fn restore(
        id: PermissionId,
        name: impl Into<String>,
        key: PermissionKey,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            key,
            description: description.into(),
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the `resource:action` key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}
