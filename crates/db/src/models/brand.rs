use a4l_core::catalog::{Brand, BrandSummary};
use a4l_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct BrandRow {
    pub id: DbId,
    pub name: String,
    pub logo: Option<String>,
    pub dealership_name: Option<String>,
    pub dealership_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Brand {
            id: row.id,
            name: row.name,
            logo: row.logo,
            dealership_name: row.dealership_name,
            dealership_location: row.dealership_location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A brand row joined with its vehicle count.
#[derive(Debug, Clone, FromRow)]
pub struct BrandSummaryRow {
    #[sqlx(flatten)]
    pub brand: BrandRow,
    pub vehicle_count: i64,
}

impl From<BrandSummaryRow> for BrandSummary {
    fn from(row: BrandSummaryRow) -> Self {
        BrandSummary {
            brand: row.brand.into(),
            vehicle_count: row.vehicle_count,
        }
    }
}
