//! Repository for the `brands` table.

use a4l_core::catalog::BrandInput;
use a4l_core::types::DbId;
use sqlx::PgPool;

use crate::models::brand::{BrandRow, BrandSummaryRow};

const COLUMNS: &str =
    "id, name, logo, dealership_name, dealership_location, created_at, updated_at";

pub struct BrandRepo;

impl BrandRepo {
    /// All brands ordered by name, each with its vehicle count.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<BrandSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, BrandSummaryRow>(
            "SELECT b.id, b.name, b.logo, b.dealership_name, b.dealership_location,
                    b.created_at, b.updated_at, COUNT(v.id) AS vehicle_count
             FROM brands b
             LEFT JOIN vehicles v ON v.brand_id = b.id
             GROUP BY b.id
             ORDER BY b.name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BrandRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE id = $1");
        sqlx::query_as::<_, BrandRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<BrandRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE name = $1");
        sqlx::query_as::<_, BrandRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &BrandInput) -> Result<BrandRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO brands (name, logo, dealership_name, dealership_location)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandRow>(&query)
            .bind(&input.name)
            .bind(&input.logo)
            .bind(&input.dealership_name)
            .bind(&input.dealership_location)
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field. Returns `None` if missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BrandInput,
    ) -> Result<Option<BrandRow>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET
                name = $2,
                logo = $3,
                dealership_name = $4,
                dealership_location = $5,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.logo)
            .bind(&input.dealership_name)
            .bind(&input.dealership_location)
            .fetch_optional(pool)
            .await
    }

    /// Delete a brand. Its vehicles go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
