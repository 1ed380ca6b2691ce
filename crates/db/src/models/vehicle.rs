use a4l_core::catalog::Vehicle;
use a4l_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `vehicles` table. `images` is a `TEXT[]` column.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleRow {
    pub id: DbId,
    pub brand_id: DbId,
    pub name: String,
    pub description: Option<String>,
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

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            brand_id: row.brand_id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            power: row.power,
            trunk: row.trunk,
            vmax: row.vmax,
            seats: row.seats,
            images: row.images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
