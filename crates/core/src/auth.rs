use serde::{Deserialize, Serialize};

use crate::{OrganizationId, UserId};

/// Verified caller identity handed over by the authentication layer.
///
/// Credential verification happens before this value exists; authorization
/// code trusts it as-is and derives everything else from the role store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    user_id: UserId,
    phone: String,
    is_active: bool,
    organization_id: Option<OrganizationId>,
    is_super_admin: bool,
}

impl AuthenticatedUser {
    /// Creates an authenticated user bound to an organization.
    #[must_use]
    pub fn new(
        user_id: UserId,
        phone: impl Into<String>,
        organization_id: Option<OrganizationId>,
    ) -> Self {
        Self {
            user_id,
            phone: phone.into(),
            is_active: true,
            organization_id,
            is_super_admin: false,
        }
    }

    /// Marks the account active or inactive.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Marks the identity as the system-wide super-admin.
    #[must_use]
    pub fn with_super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the login phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Returns whether the account may be used.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the organization the user belongs to, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns whether the identity bypasses tenant and permission checks.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }
}
