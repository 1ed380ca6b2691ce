//! Repository for the `vehicles` table.

use a4l_core::catalog::VehicleInput;
use a4l_core::types::DbId;
use sqlx::PgPool;

use crate::models::vehicle::VehicleRow;

const COLUMNS: &str = "id, brand_id, name, description, price, category, \
    power, trunk, vmax, seats, images, created_at, updated_at";

pub struct VehicleRepo;

impl VehicleRepo {
    /// Vehicles ordered by name, optionally restricted to one brand.
    pub async fn list(pool: &PgPool, brand_id: Option<DbId>) -> Result<Vec<VehicleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vehicles
             WHERE ($1::BIGINT IS NULL OR brand_id = $1)
             ORDER BY name, id"
        );
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(brand_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VehicleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &VehicleInput) -> Result<VehicleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles
                (brand_id, name, description, price, category, power, trunk, vmax, seats, images)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(input.brand_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.category)
            .bind(input.power)
            .bind(input.trunk)
            .bind(input.vmax)
            .bind(input.seats)
            .bind(&input.images)
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field. Returns `None` if missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &VehicleInput,
    ) -> Result<Option<VehicleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE vehicles SET
                brand_id = $2,
                name = $3,
                description = $4,
                price = $5,
                category = $6,
                power = $7,
                trunk = $8,
                vmax = $9,
                seats = $10,
                images = $11,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .bind(input.brand_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.category)
            .bind(input.power)
            .bind(input.trunk)
            .bind(input.vmax)
            .bind(input.seats)
            .bind(&input.images)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
