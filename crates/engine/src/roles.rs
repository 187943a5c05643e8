//! Static catalog of organization roles and the permissions they grant.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Every permission the platform knows about.
///
/// A closed set: asking for a permission that does not exist is a compile
/// error, not a silent `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDisbursements,
    CreateDisbursements,
    StartDisbursements,
    CancelDisbursements,
    ViewPayments,
    RetryPayments,
    CancelPayments,
    ViewReceivers,
    EditReceivers,
    ExportData,
    ViewStatistics,
    ManageWallets,
    ManageAssets,
    ManageApiKeys,
    ManageUsers,
    ManageRoles,
    ManageOrganization,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewDisbursements => "view_disbursements",
            Self::CreateDisbursements => "create_disbursements",
            Self::StartDisbursements => "start_disbursements",
            Self::CancelDisbursements => "cancel_disbursements",
            Self::ViewPayments => "view_payments",
            Self::RetryPayments => "retry_payments",
            Self::CancelPayments => "cancel_payments",
            Self::ViewReceivers => "view_receivers",
            Self::EditReceivers => "edit_receivers",
            Self::ExportData => "export_data",
            Self::ViewStatistics => "view_statistics",
            Self::ManageWallets => "manage_wallets",
            Self::ManageAssets => "manage_assets",
            Self::ManageApiKeys => "manage_api_keys",
            Self::ManageUsers => "manage_users",
            Self::ManageRoles => "manage_roles",
            Self::ManageOrganization => "manage_organization",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a user in the organization.
///
/// Roles are ordered by rank:
/// - `owner` (100): everything, including organization settings.
/// - `financial_controller` (80): money movement and user management.
/// - `business` (75): day-to-day disbursement work.
/// - `developer` (60): read access and API keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    FinancialController,
    Business,
    Developer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Owner,
        Role::FinancialController,
        Role::Business,
        Role::Developer,
    ];

    /// Returns the canonical role string used by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::FinancialController => "financial_controller",
            Self::Business => "business",
            Self::Developer => "developer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
    }

    pub fn info(self) -> &'static RoleInfo {
        match self {
            Self::Owner => &OWNER,
            Self::FinancialController => &FINANCIAL_CONTROLLER,
            Self::Business => &BUSINESS,
            Self::Developer => &DEVELOPER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
            .ok_or_else(|| EngineError::invalid("role", format!("invalid role: {}", value.trim())))
    }
}

/// Catalog entry of a role.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    /// `None` only for [`RoleInfo::UNKNOWN`].
    pub role: Option<Role>,
    pub display_name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [Permission],
    pub rank: u8,
}

impl RoleInfo {
    /// Stand-in for unknown or absent roles: no permissions, rank 0.
    pub const UNKNOWN: RoleInfo = RoleInfo {
        role: None,
        display_name: "Unknown",
        description: "Unrecognized role without permissions",
        permissions: &[],
        rank: 0,
    };

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn is_unknown(&self) -> bool {
        self.role.is_none()
    }
}

static OWNER: RoleInfo = RoleInfo {
    role: Some(Role::Owner),
    display_name: "Owner",
    description: "Full control of the organization, its users and its funds",
    permissions: &[
        Permission::ViewDisbursements,
        Permission::CreateDisbursements,
        Permission::StartDisbursements,
        Permission::CancelDisbursements,
        Permission::ViewPayments,
        Permission::RetryPayments,
        Permission::CancelPayments,
        Permission::ViewReceivers,
        Permission::EditReceivers,
        Permission::ExportData,
        Permission::ViewStatistics,
        Permission::ManageWallets,
        Permission::ManageAssets,
        Permission::ManageApiKeys,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManageOrganization,
    ],
    rank: 100,
};

static FINANCIAL_CONTROLLER: RoleInfo = RoleInfo {
    role: Some(Role::FinancialController),
    display_name: "Financial Controller",
    description: "Moves funds and manages users, without organization settings",
    permissions: &[
        Permission::ViewDisbursements,
        Permission::CreateDisbursements,
        Permission::StartDisbursements,
        Permission::CancelDisbursements,
        Permission::ViewPayments,
        Permission::RetryPayments,
        Permission::CancelPayments,
        Permission::ViewReceivers,
        Permission::EditReceivers,
        Permission::ExportData,
        Permission::ViewStatistics,
        Permission::ManageWallets,
        Permission::ManageAssets,
        Permission::ManageUsers,
        Permission::ManageRoles,
    ],
    rank: 80,
};

static BUSINESS: RoleInfo = RoleInfo {
    role: Some(Role::Business),
    display_name: "Business",
    description: "Prepares and starts disbursements, manages receivers",
    permissions: &[
        Permission::ViewDisbursements,
        Permission::CreateDisbursements,
        Permission::StartDisbursements,
        Permission::ViewPayments,
        Permission::ViewReceivers,
        Permission::EditReceivers,
        Permission::ExportData,
        Permission::ViewStatistics,
        Permission::ManageRoles,
    ],
    rank: 75,
};

static DEVELOPER: RoleInfo = RoleInfo {
    role: Some(Role::Developer),
    display_name: "Developer",
    description: "Read-only access to records and management of API keys",
    permissions: &[
        Permission::ViewDisbursements,
        Permission::ViewPayments,
        Permission::ViewReceivers,
        Permission::ViewStatistics,
        Permission::ManageApiKeys,
    ],
    rank: 60,
};

/// Resolves a role identifier. Unknown identifiers map to
/// [`RoleInfo::UNKNOWN`] instead of failing.
pub fn resolve(value: &str) -> &'static RoleInfo {
    Role::parse(value).map_or(&RoleInfo::UNKNOWN, Role::info)
}

/// Anything that identifies a role: a typed [`Role`], an optional one, or the
/// raw identifier received from a session.
pub trait RoleRef {
    fn role_info(&self) -> &'static RoleInfo;
}

impl RoleRef for Role {
    fn role_info(&self) -> &'static RoleInfo {
        self.info()
    }
}

impl RoleRef for Option<Role> {
    fn role_info(&self) -> &'static RoleInfo {
        self.map_or(&RoleInfo::UNKNOWN, Role::info)
    }
}

impl RoleRef for str {
    fn role_info(&self) -> &'static RoleInfo {
        resolve(self)
    }
}

impl RoleRef for String {
    fn role_info(&self) -> &'static RoleInfo {
        resolve(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_strictly_ordered() {
        let ranks: Vec<u8> = Role::ALL.iter().map(|r| r.info().rank).collect();
        assert_eq!(ranks, vec![100, 80, 75, 60]);
    }

    #[test]
    fn owner_holds_every_permission_granted_to_anyone() {
        for role in Role::ALL {
            for permission in role.info().permissions {
                assert!(Role::Owner.info().grants(*permission));
            }
        }
    }

    #[test]
    fn catalog_entries_point_back_to_their_role() {
        for role in Role::ALL {
            assert_eq!(role.info().role, Some(role));
        }
    }

    #[test]
    fn resolve_falls_back_to_unknown() {
        assert_eq!(resolve("Business").role, Some(Role::Business));
        let unknown = resolve("admin");
        assert!(unknown.is_unknown());
        assert_eq!(unknown.rank, 0);
        assert!(unknown.permissions.is_empty());
    }
}
