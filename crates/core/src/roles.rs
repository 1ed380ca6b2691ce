//! Role entity and the well-known system roles.
//!
//! The three system roles are seeded by [`RoleRegistry::bootstrap`] and are
//! never mutated or deleted afterwards.
//!
//! [`RoleRegistry::bootstrap`]: crate::registry::RoleRegistry::bootstrap

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityFlags};
use crate::types::{DbId, Timestamp};

pub const ROLE_SUPERADMIN: &str = "superadmin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// A named permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
    pub is_system: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Role {
    pub fn is_superadmin(&self) -> bool {
        self.name == ROLE_SUPERADMIN
    }
}

/// A role together with the number of accounts assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    #[serde(flatten)]
    pub role: Role,
    pub account_count: i64,
}

/// DTO for inserting a role.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub flags: CapabilityFlags,
    pub is_system: bool,
}

/// DTO for updating a role. `name` is kept when `None`; flags are replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
}

/// The system roles seeded at bootstrap, in creation order.
pub fn system_roles() -> [NewRole; 3] {
    [
        NewRole {
            name: ROLE_SUPERADMIN.to_string(),
            flags: CapabilityFlags::ALL,
            is_system: true,
        },
        NewRole {
            name: ROLE_ADMIN.to_string(),
            flags: CapabilityFlags::ALL
                .without(Capability::ManageUsers)
                .without(Capability::ManageRoles),
            is_system: true,
        },
        NewRole {
            name: ROLE_USER.to_string(),
            flags: CapabilityFlags::NONE,
            is_system: true,
        },
    ]
}
