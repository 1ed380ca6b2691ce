//! Role row model.

use a4l_core::capability::CapabilityFlags;
use a4l_core::roles::{Role, RoleSummary};
use a4l_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: DbId,
    pub name: String,
    pub can_access_admin: bool,
    pub can_edit_brands: bool,
    pub can_edit_vehicles: bool,
    pub can_delete_brands: bool,
    pub can_delete_vehicles: bool,
    pub can_import: bool,
    pub can_manage_users: bool,
    pub can_manage_roles: bool,
    pub can_manage_dealerships: bool,
    pub can_manage_site: bool,
    pub is_system: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
            flags: CapabilityFlags {
                can_access_admin: row.can_access_admin,
                can_edit_brands: row.can_edit_brands,
                can_edit_vehicles: row.can_edit_vehicles,
                can_delete_brands: row.can_delete_brands,
                can_delete_vehicles: row.can_delete_vehicles,
                can_import: row.can_import,
                can_manage_users: row.can_manage_users,
                can_manage_roles: row.can_manage_roles,
                can_manage_dealerships: row.can_manage_dealerships,
                can_manage_site: row.can_manage_site,
            },
            is_system: row.is_system,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A role row joined with its account count.
#[derive(Debug, Clone, FromRow)]
pub struct RoleSummaryRow {
    #[sqlx(flatten)]
    pub role: RoleRow,
    pub account_count: i64,
}

impl From<RoleSummaryRow> for RoleSummary {
    fn from(row: RoleSummaryRow) -> Self {
        RoleSummary {
            role: row.role.into(),
            account_count: row.account_count,
        }
    }
}
