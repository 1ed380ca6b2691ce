//! Capability names and the flat flag set stored on every role.
//!
//! The permission model is a tagged set of named booleans with no hierarchy.
//! [`Capability`] names a single flag; [`CapabilityFlags`] is the full set as
//! persisted in the `roles` table.

use serde::{Deserialize, Serialize};

/// One named boolean permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AccessAdmin,
    EditBrands,
    EditVehicles,
    DeleteBrands,
    DeleteVehicles,
    Import,
    ManageUsers,
    ManageRoles,
    ManageDealerships,
    ManageSite,
}

impl Capability {
    /// Every capability, in storage column order.
    pub const ALL: [Capability; 10] = [
        Capability::AccessAdmin,
        Capability::EditBrands,
        Capability::EditVehicles,
        Capability::DeleteBrands,
        Capability::DeleteVehicles,
        Capability::Import,
        Capability::ManageUsers,
        Capability::ManageRoles,
        Capability::ManageDealerships,
        Capability::ManageSite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::AccessAdmin => "access_admin",
            Capability::EditBrands => "edit_brands",
            Capability::EditVehicles => "edit_vehicles",
            Capability::DeleteBrands => "delete_brands",
            Capability::DeleteVehicles => "delete_vehicles",
            Capability::Import => "import",
            Capability::ManageUsers => "manage_users",
            Capability::ManageRoles => "manage_roles",
            Capability::ManageDealerships => "manage_dealerships",
            Capability::ManageSite => "manage_site",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ten capability flags carried by a role.
///
/// Missing fields deserialize as `false`, so a partial JSON body grants only
/// what it names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityFlags {
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
}

impl CapabilityFlags {
    /// No capability granted.
    pub const NONE: CapabilityFlags = CapabilityFlags {
        can_access_admin: false,
        can_edit_brands: false,
        can_edit_vehicles: false,
        can_delete_brands: false,
        can_delete_vehicles: false,
        can_import: false,
        can_manage_users: false,
        can_manage_roles: false,
        can_manage_dealerships: false,
        can_manage_site: false,
    };

    /// Every capability granted.
    pub const ALL: CapabilityFlags = CapabilityFlags {
        can_access_admin: true,
        can_edit_brands: true,
        can_edit_vehicles: true,
        can_delete_brands: true,
        can_delete_vehicles: true,
        can_import: true,
        can_manage_users: true,
        can_manage_roles: true,
        can_manage_dealerships: true,
        can_manage_site: true,
    };

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::AccessAdmin => self.can_access_admin,
            Capability::EditBrands => self.can_edit_brands,
            Capability::EditVehicles => self.can_edit_vehicles,
            Capability::DeleteBrands => self.can_delete_brands,
            Capability::DeleteVehicles => self.can_delete_vehicles,
            Capability::Import => self.can_import,
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManageRoles => self.can_manage_roles,
            Capability::ManageDealerships => self.can_manage_dealerships,
            Capability::ManageSite => self.can_manage_site,
        }
    }

    pub fn set(&mut self, capability: Capability, value: bool) {
        let flag = match capability {
            Capability::AccessAdmin => &mut self.can_access_admin,
            Capability::EditBrands => &mut self.can_edit_brands,
            Capability::EditVehicles => &mut self.can_edit_vehicles,
            Capability::DeleteBrands => &mut self.can_delete_brands,
            Capability::DeleteVehicles => &mut self.can_delete_vehicles,
            Capability::Import => &mut self.can_import,
            Capability::ManageUsers => &mut self.can_manage_users,
            Capability::ManageRoles => &mut self.can_manage_roles,
            Capability::ManageDealerships => &mut self.can_manage_dealerships,
            Capability::ManageSite => &mut self.can_manage_site,
        };
        *flag = value;
    }

    /// Builder-style variants of [`set`](Self::set).
    pub fn with(mut self, capability: Capability) -> Self {
        self.set(capability, true);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.set(capability, false);
        self
    }

    /// The capabilities currently granted, in storage column order.
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }
}
