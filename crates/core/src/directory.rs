//! The in-game dealership directory.
//!
//! These are the fixed storefronts of the game world, distinct from the
//! player-run dealerships in [`crate::dealership`]. Brands normally carry their dealership explicitly. When a brand is created
//! without one (manual creation with empty fields, or bulk import), it is
//! placed by vehicle category first and otherwise by the first letter of the
//! brand name.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: &'static str,
    pub location: &'static str,
}

const fn d(name: &'static str, location: &'static str) -> DirectoryEntry {
    DirectoryEntry { name, location }
}

pub const DEALERSHIP_A_F: DirectoryEntry = d("Concessionnaire A-F", "Perrytonia");
pub const DEALERSHIP_G_L: DirectoryEntry = d("Concessionnaire G-L", "Los Diablos");
pub const DEALERSHIP_M_R: DirectoryEntry = d("Concessionnaire M-R", "Jamestown");
pub const DEALERSHIP_S_Z: DirectoryEntry = d("Concessionnaire S-Z", "Watergate");
pub const DEALERSHIP_MOTO: DirectoryEntry = d("Concessionnaire Moto/Quad", "Woodland Heights");
pub const DEALERSHIP_TRANSPORT: DirectoryEntry = d("Concessionnaire Transports", "Lakeside");
pub const DEALERSHIP_AIR: DirectoryEntry = d("Concessionnaire Aérien", "Aux Aéroports");
pub const DEALERSHIP_SEA: DirectoryEntry = d("Concessionnaire Maritime", "Aux Ports");
pub const DEALERSHIP_EVENT: DirectoryEntry = d("Concessionnaire EVENT", "Palm");

/// Placeholder for brands that match no rule.
pub const DEALERSHIP_UNKNOWN: DirectoryEntry = d("Concessionnaire", "Inconnu");

/// Every official dealership, in display order.
pub const DIRECTORY: [DirectoryEntry; 9] = [
    DEALERSHIP_A_F,
    DEALERSHIP_G_L,
    DEALERSHIP_M_R,
    DEALERSHIP_S_Z,
    DEALERSHIP_MOTO,
    DEALERSHIP_TRANSPORT,
    DEALERSHIP_AIR,
    DEALERSHIP_SEA,
    DEALERSHIP_EVENT,
];

fn by_category(category: &str) -> Option<DirectoryEntry> {
    match category.trim().to_lowercase().as_str() {
        "moto" | "quad" => Some(DEALERSHIP_MOTO),
        "utilitaire" | "transport" | "poids lourd" | "camion" => Some(DEALERSHIP_TRANSPORT),
        "event" | "shop event" => Some(DEALERSHIP_EVENT),
        "avion" | "aérien" => Some(DEALERSHIP_AIR),
        "bateau" | "maritime" => Some(DEALERSHIP_SEA),
        _ => None,
    }
}

/// Pick the dealership for a brand, using a vehicle category when known.
pub fn dealership_for(brand_name: &str, category: Option<&str>) -> DirectoryEntry {
    if let Some(found) = category.and_then(by_category) {
        return found;
    }
    match brand_name.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('A'..='F') => DEALERSHIP_A_F,
        Some('G'..='L') => DEALERSHIP_G_L,
        Some('M'..='R') => DEALERSHIP_M_R,
        Some('S'..='Z') => DEALERSHIP_S_Z,
        _ => DEALERSHIP_UNKNOWN,
    }
}
