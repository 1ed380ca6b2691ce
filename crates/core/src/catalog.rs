//! Brands, vehicles, and JSON bulk import.
//!
//! Reads are public. Every mutation is gated by the matching capability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authorization::require;
use crate::capability::Capability;
use crate::directory::dealership_for;
use crate::error::CoreError;
use crate::principal::Principal;
use crate::store::Store;
use crate::types::{DbId, Timestamp};

/// Vehicle name used by the importer when an entry has neither `name` nor `model`.
pub const UNNAMED_VEHICLE: &str = "Sans nom";

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brand {
    pub id: DbId,
    pub name: String,
    pub logo: Option<String>,
    pub dealership_name: Option<String>,
    pub dealership_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A brand with the number of vehicles it lists.
#[derive(Debug, Clone, Serialize)]
pub struct BrandSummary {
    #[serde(flatten)]
    pub brand: Brand,
    pub vehicle_count: i64,
}

/// A brand with all of its vehicles.
#[derive(Debug, Clone, Serialize)]
pub struct BrandDetail {
    #[serde(flatten)]
    pub brand: Brand,
    pub vehicles: Vec<Vehicle>,
}

/// Create / update payload for a brand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandInput {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub dealership_name: Option<String>,
    #[serde(default)]
    pub dealership_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub brand_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Price in whole in-game dollars.
    pub price: i64,
    pub category: Option<String>,
    pub power: Option<i32>,
    pub trunk: Option<i32>,
    pub vmax: Option<i32>,
    pub seats: Option<i32>,
    pub images: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create / update payload for a vehicle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleInput {
    pub brand_id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub trunk: Option<i32>,
    #[serde(default)]
    pub vmax: Option<i32>,
    #[serde(default)]
    pub seats: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub errors: usize,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_brand(input: &BrandInput) -> Result<BrandInput, CoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("brand name is required".into()));
    }
    let mut brand = BrandInput {
        name: name.to_string(),
        logo: blank_to_none(input.logo.clone()),
        dealership_name: blank_to_none(input.dealership_name.clone()),
        dealership_location: blank_to_none(input.dealership_location.clone()),
    };
    if brand.dealership_name.is_none() || brand.dealership_location.is_none() {
        let fallback = dealership_for(&brand.name, None);
        brand
            .dealership_name
            .get_or_insert_with(|| fallback.name.to_string());
        brand
            .dealership_location
            .get_or_insert_with(|| fallback.location.to_string());
    }
    Ok(brand)
}

fn validate_vehicle(input: &VehicleInput) -> Result<VehicleInput, CoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("vehicle name is required".into()));
    }
    if input.price < 0 {
        return Err(CoreError::Validation("price cannot be negative".into()));
    }
    let counts = [
        ("power", input.power),
        ("trunk", input.trunk),
        ("vmax", input.vmax),
        ("seats", input.seats),
    ];
    if let Some((field, _)) = counts.iter().find(|(_, v)| v.is_some_and(|v| v < 0)) {
        return Err(CoreError::Validation(format!("{field} cannot be negative")));
    }

    Ok(VehicleInput {
        name: name.to_string(),
        description: blank_to_none(input.description.clone()),
        category: blank_to_none(input.category.clone()),
        images: input
            .images
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect(),
        ..input.clone()
    })
}

// ---------------------------------------------------------------------------
// Lenient import parsing
// ---------------------------------------------------------------------------

/// Parse an integer the way a form field would: numbers are truncated,
/// strings are read up to the first non-digit (`"250 km/h"` -> 250).
pub fn parse_int_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

fn optional_count(entry: &Value, field: &str) -> Option<i32> {
    entry
        .get(field)
        .and_then(parse_int_lenient)
        .filter(|n| *n != 0)
        .and_then(|n| i32::try_from(n).ok())
}

fn text(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a vehicle payload from one import entry. `brand_id` is filled in later.
fn vehicle_from_entry(entry: &Value) -> VehicleInput {
    let name = text(entry, "name")
        .or_else(|| text(entry, "model"))
        .unwrap_or_else(|| UNNAMED_VEHICLE.to_string());
    let images = entry
        .get("images")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    VehicleInput {
        brand_id: 0,
        name,
        description: text(entry, "description"),
        price: entry.get("price").and_then(parse_int_lenient).unwrap_or(0),
        category: text(entry, "category"),
        power: optional_count(entry, "power"),
        trunk: optional_count(entry, "trunk"),
        vmax: optional_count(entry, "vmax"),
        seats: optional_count(entry, "seats"),
        images,
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct CatalogService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> CatalogService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn list_brands(&self) -> Result<Vec<BrandSummary>, CoreError> {
        Ok(self.store.list_brands().await?)
    }

    pub async fn brand(&self, id: DbId) -> Result<BrandDetail, CoreError> {
        let brand = self
            .store
            .find_brand(id)
            .await?
            .ok_or_else(|| CoreError::not_found("brand", id))?;
        let vehicles = self.store.list_vehicles(Some(id)).await?;
        Ok(BrandDetail { brand, vehicles })
    }

    pub async fn list_vehicles(&self, brand_id: Option<DbId>) -> Result<Vec<Vehicle>, CoreError> {
        Ok(self.store.list_vehicles(brand_id).await?)
    }

    pub async fn vehicle(&self, id: DbId) -> Result<Vehicle, CoreError> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| CoreError::not_found("vehicle", id))
    }

    pub async fn create_brand(&self, actor: &Principal, input: &BrandInput) -> Result<Brand, CoreError> {
        require(actor, Capability::EditBrands)?;
        let input = validate_brand(input)?;
        if self.store.find_brand_by_name(&input.name).await?.is_some() {
            return Err(CoreError::DuplicateName(format!("brand '{}'", input.name)));
        }
        let brand = self.store.create_brand(&input).await?;
        tracing::info!(brand_id = brand.id, actor = actor.account_id, "Brand created");
        Ok(brand)
    }

    pub async fn update_brand(
        &self,
        actor: &Principal,
        id: DbId,
        input: &BrandInput,
    ) -> Result<Brand, CoreError> {
        require(actor, Capability::EditBrands)?;
        let input = validate_brand(input)?;
        if let Some(other) = self.store.find_brand_by_name(&input.name).await? {
            if other.id != id {
                return Err(CoreError::DuplicateName(format!("brand '{}'", input.name)));
            }
        }
        self.store
            .update_brand(id, &input)
            .await?
            .ok_or_else(|| CoreError::not_found("brand", id))
    }

    /// Delete a brand together with its vehicles.
    pub async fn delete_brand(&self, actor: &Principal, id: DbId) -> Result<(), CoreError> {
        require(actor, Capability::DeleteBrands)?;
        if !self.store.delete_brand(id).await? {
            return Err(CoreError::not_found("brand", id));
        }
        tracing::info!(brand_id = id, actor = actor.account_id, "Brand deleted");
        Ok(())
    }

    async fn ensure_brand_exists(&self, brand_id: DbId) -> Result<(), CoreError> {
        self.store
            .find_brand(brand_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("brand", brand_id))
    }

    pub async fn create_vehicle(
        &self,
        actor: &Principal,
        input: &VehicleInput,
    ) -> Result<Vehicle, CoreError> {
        require(actor, Capability::EditVehicles)?;
        let input = validate_vehicle(input)?;
        self.ensure_brand_exists(input.brand_id).await?;
        let vehicle = self.store.create_vehicle(&input).await?;
        tracing::info!(vehicle_id = vehicle.id, actor = actor.account_id, "Vehicle created");
        Ok(vehicle)
    }

    pub async fn update_vehicle(
        &self,
        actor: &Principal,
        id: DbId,
        input: &VehicleInput,
    ) -> Result<Vehicle, CoreError> {
        require(actor, Capability::EditVehicles)?;
        let input = validate_vehicle(input)?;
        self.ensure_brand_exists(input.brand_id).await?;
        self.store
            .update_vehicle(id, &input)
            .await?
            .ok_or_else(|| CoreError::not_found("vehicle", id))
    }

    pub async fn delete_vehicle(&self, actor: &Principal, id: DbId) -> Result<(), CoreError> {
        require(actor, Capability::DeleteVehicles)?;
        if !self.store.delete_vehicle(id).await? {
            return Err(CoreError::not_found("vehicle", id));
        }
        tracing::info!(vehicle_id = id, actor = actor.account_id, "Vehicle deleted");
        Ok(())
    }

    /// Import vehicles from `{ "vehicles": [...] }`.
    ///
    /// Each entry names its brand, which is created when missing. A failing
    /// entry is counted in [`ImportReport::errors`] and does not stop the run.
    pub async fn import(&self, actor: &Principal, payload: &Value) -> Result<ImportReport, CoreError> {
        require(actor, Capability::Import)?;
        let entries = payload
            .get("vehicles")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::Validation("'vehicles' must be an array".into()))?;

        let mut report = ImportReport::default();
        for entry in entries {
            match self.import_entry(entry).await {
                Ok(vehicle) => {
                    tracing::debug!(vehicle_id = vehicle.id, "Imported vehicle");
                    report.created += 1;
                }
                Err(e) => {
                    tracing::warn!(entry = %entry, error = %e, "Import entry rejected");
                    report.errors += 1;
                }
            }
        }

        tracing::info!(
            created = report.created,
            errors = report.errors,
            actor = actor.account_id,
            "Import finished",
        );
        Ok(report)
    }

    async fn import_entry(&self, entry: &Value) -> Result<Vehicle, CoreError> {
        let brand_name =
            text(entry, "brand").ok_or_else(|| CoreError::Validation("missing brand".into()))?;
        // Validate before the brand lookup so a bad entry creates nothing.
        let mut vehicle = validate_vehicle(&vehicle_from_entry(entry))?;

        let brand = match self.store.find_brand_by_name(&brand_name).await? {
            Some(brand) => brand,
            None => {
                let dealership = dealership_for(&brand_name, vehicle.category.as_deref());
                self.store
                    .create_brand(&BrandInput {
                        name: brand_name,
                        logo: None,
                        dealership_name: Some(dealership.name.to_string()),
                        dealership_location: Some(dealership.location.to_string()),
                    })
                    .await?
            }
        };

        vehicle.brand_id = brand.id;
        Ok(self.store.create_vehicle(&vehicle).await?)
    }
}
