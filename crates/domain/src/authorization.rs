use serde::Serialize;

use crate::permission::{PermissionAction, PermissionKey};
use crate::principal::Principal;

/// Outcome of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessDecision {
    /// The request may proceed.
    Allow(AllowReason),
    /// The request must stop without side effects.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Returns whether the decision allows the request.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Why a request was allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AllowReason {
    /// The principal is a super-admin.
    SuperAdmin,
    /// A permission with exactly the requested action is held.
    Granted {
        /// Name of the matching permission.
        permission: String,
    },
    /// A `MANAGE` permission on the resource is held.
    ManageWildcard {
        /// Name of the matching permission.
        permission: String,
    },
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    /// No held permission covers the requested key.
    MissingPermission {
        /// Requested `resource:action`.
        required: PermissionKey,
    },
}

/// Decides whether `principal` may perform `action` on `resource`.
///
/// Super-admins are always allowed. Otherwise a held permission on the same
/// resource must carry the requested action or `MANAGE`. Never fails.
#[must_use]
pub fn authorize(principal: &Principal, resource: &str, action: PermissionAction) -> AccessDecision {
    if principal.is_super_admin() {
        return AccessDecision::Allow(AllowReason::SuperAdmin);
    }

    let on_resource = || {
        principal
            .permissions()
            .iter()
            .filter(|permission| permission.key().resource() == resource)
    };

    if let Some(permission) = on_resource().find(|permission| permission.key().action() == action)
    {
        return AccessDecision::Allow(AllowReason::Granted {
            permission: permission.name().to_owned(),
        });
    }

    if let Some(permission) =
        on_resource().find(|permission| permission.key().action().satisfies(action))
    {
        return AccessDecision::Allow(AllowReason::ManageWildcard {
            permission: permission.name().to_owned(),
        });
    }

    AccessDecision::Deny(DenyReason::MissingPermission {
        required: PermissionKey::new(resource, action),
    })
}
