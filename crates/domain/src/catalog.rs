//! Compiled-in permission catalog and default role templates.

use crate::permission::{PermissionAction, PermissionDefinition};

/// Resource names referenced by the catalog and by operation descriptors.
pub mod resources {
    /// Patient records.
    pub const PATIENTS: &str = "patients";
    /// Clinical visits.
    pub const VISITS: &str = "visits";
    /// Appointment scheduling.
    pub const APPOINTMENTS: &str = "appointments";
    /// Invoices.
    pub const INVOICES: &str = "invoices";
    /// Payments against invoices.
    pub const PAYMENTS: &str = "payments";
    /// Service orders raised during visits.
    pub const SERVICE_ORDERS: &str = "service_orders";
    /// Employee records.
    pub const EMPLOYEES: &str = "employees";
    /// Treatment protocols and form templates.
    pub const PROTOCOLS: &str = "protocols";
    /// Dashboards and reports.
    pub const REPORTS: &str = "reports";
    /// Roles and role assignments.
    pub const ROLES: &str = "roles";
    /// Organization onboarding and settings.
    pub const ORGANIZATIONS: &str = "organizations";
}

use PermissionAction::{Manage, Read};

const PERMISSION_CATALOG: &[PermissionDefinition] = &[
    PermissionDefinition::new(
        "MANAGE_PATIENTS",
        resources::PATIENTS,
        Manage,
        "Full access to patient records",
    ),
    PermissionDefinition::new(
        "READ_PATIENTS",
        resources::PATIENTS,
        Read,
        "View patient records",
    ),
    PermissionDefinition::new(
        "MANAGE_VISITS",
        resources::VISITS,
        Manage,
        "Full access to visits",
    ),
    PermissionDefinition::new("READ_VISITS", resources::VISITS, Read, "View visits"),
    PermissionDefinition::new(
        "MANAGE_APPOINTMENTS",
        resources::APPOINTMENTS,
        Manage,
        "Full access to appointments",
    ),
    PermissionDefinition::new(
        "READ_APPOINTMENTS",
        resources::APPOINTMENTS,
        Read,
        "View appointments",
    ),
    PermissionDefinition::new(
        "MANAGE_INVOICES",
        resources::INVOICES,
        Manage,
        "Full access to invoices",
    ),
    PermissionDefinition::new("READ_INVOICES", resources::INVOICES, Read, "View invoices"),
    PermissionDefinition::new(
        "MANAGE_PAYMENTS",
        resources::PAYMENTS,
        Manage,
        "Record and adjust payments",
    ),
    PermissionDefinition::new("READ_PAYMENTS", resources::PAYMENTS, Read, "View payments"),
    PermissionDefinition::new(
        "MANAGE_SERVICE_ORDERS",
        resources::SERVICE_ORDERS,
        Manage,
        "Full access to service orders",
    ),
    PermissionDefinition::new(
        "READ_SERVICE_ORDERS",
        resources::SERVICE_ORDERS,
        Read,
        "View service orders",
    ),
    PermissionDefinition::new(
        "MANAGE_EMPLOYEES",
        resources::EMPLOYEES,
        Manage,
        "Full access to employee records",
    ),
    PermissionDefinition::new(
        "READ_EMPLOYEES",
        resources::EMPLOYEES,
        Read,
        "View employee records",
    ),
    PermissionDefinition::new(
        "MANAGE_PROTOCOLS",
        resources::PROTOCOLS,
        Manage,
        "Edit treatment protocols and form templates",
    ),
    PermissionDefinition::new(
        "READ_PROTOCOLS",
        resources::PROTOCOLS,
        Read,
        "View treatment protocols",
    ),
    PermissionDefinition::new(
        "MANAGE_REPORTS",
        resources::REPORTS,
        Manage,
        "Configure dashboards and reports",
    ),
    PermissionDefinition::new(
        "READ_REPORTS",
        resources::REPORTS,
        Read,
        "View dashboards and reports",
    ),
    PermissionDefinition::new(
        "MANAGE_ROLES",
        resources::ROLES,
        Manage,
        "Create, edit and assign roles",
    ),
    PermissionDefinition::new("READ_ROLES", resources::ROLES, Read, "View roles"),
    PermissionDefinition::new(
        "MANAGE_ORGANIZATIONS",
        resources::ORGANIZATIONS,
        Manage,
        "Onboard organizations and change their settings",
    ),
    PermissionDefinition::new(
        "READ_ORGANIZATIONS",
        resources::ORGANIZATIONS,
        Read,
        "View organization settings",
    ),
];

/// Returns the compiled-in permission catalog.
#[must_use]
pub fn catalog_permissions() -> &'static [PermissionDefinition] {
    PERMISSION_CATALOG
}

/// Finds a catalog entry by its unique name.
#[must_use]
pub fn find_catalog_permission(name: &str) -> Option<&'static PermissionDefinition> {
    PERMISSION_CATALOG
        .iter()
        .find(|definition| definition.name == name)
}

/// Permission set of a role template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePermissions {
    /// Every catalog permission.
    All,
    /// A fixed list of catalog permission names.
    Only(&'static [&'static str]),
}

/// Default role materialized for every onboarded organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTemplate {
    /// Role name, unique inside an organization.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Permissions granted by the role.
    pub permissions: TemplatePermissions,
}

impl RoleTemplate {
    /// Returns the permission names granted by this template, without duplicates.
    #[must_use]
    pub fn permission_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match self.permissions {
            TemplatePermissions::All => PERMISSION_CATALOG
                .iter()
                .map(|definition| definition.name)
                .collect(),
            TemplatePermissions::Only(names) => names.to_vec(),
        };
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Default role templates in seeding order.
const ROLE_TEMPLATES: &[RoleTemplate] = &[
    RoleTemplate {
        name: "Administrator",
        description: "Full access to every clinic module",
        permissions: TemplatePermissions::All,
    },
    RoleTemplate {
        name: "Manager",
        description: "Runs day-to-day clinic operations",
        permissions: TemplatePermissions::Only(&[
            "MANAGE_EMPLOYEES",
            "MANAGE_PATIENTS",
            "MANAGE_VISITS",
            "MANAGE_INVOICES",
            "MANAGE_SERVICE_ORDERS",
        ]),
    },
    RoleTemplate {
        name: "Doctor",
        description: "Treats patients and records visits",
        permissions: TemplatePermissions::Only(&[
            "MANAGE_PATIENTS",
            "MANAGE_VISITS",
            "MANAGE_SERVICE_ORDERS",
        ]),
    },
    RoleTemplate {
        name: "Receptionist",
        description: "Registers patients and books appointments",
        permissions: TemplatePermissions::Only(&[
            "MANAGE_PATIENTS",
            "MANAGE_APPOINTMENTS",
            "MANAGE_VISITS",
        ]),
    },
    RoleTemplate {
        name: "Accountant",
        description: "Handles billing",
        permissions: TemplatePermissions::Only(&["MANAGE_INVOICES"]),
    },
];

/// Returns the default role templates.
#[must_use]
pub fn role_templates() -> &'static [RoleTemplate] {
    ROLE_TEMPLATES
}
