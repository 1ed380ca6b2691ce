//! Repositories for the `dealerships` and `dealership_members` tables.

use a4l_core::dealership::DealershipInput;
use a4l_core::types::DbId;
use sqlx::PgPool;

use crate::models::dealership::{DealershipRow, DealershipSummaryRow, MemberRow};

const COLUMNS: &str = "id, name, description, logo, created_at, updated_at";

/// Owner first, then managers, then employees; oldest first within a role.
const MEMBER_ORDER: &str = "CASE m.role WHEN 'owner' THEN 0 WHEN 'manager' THEN 1 ELSE 2 END,
                            m.joined_at, m.account_id";

pub struct DealershipRepo;

impl DealershipRepo {
    /// All dealerships by name, each with its owner and member count.
    pub async fn list_with_owner(pool: &PgPool) -> Result<Vec<DealershipSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, DealershipSummaryRow>(
            "SELECT d.id, d.name, d.description, d.logo, d.created_at, d.updated_at,
                    o.account_id AS owner_id, a.username AS owner_username,
                    o.joined_at AS owner_joined_at,
                    (SELECT COUNT(*) FROM dealership_members c
                     WHERE c.dealership_id = d.id) AS member_count
             FROM dealerships d
             LEFT JOIN dealership_members o ON o.dealership_id = d.id AND o.role = 'owner'
             LEFT JOIN accounts a ON a.id = o.account_id
             ORDER BY d.name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DealershipRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dealerships WHERE id = $1");
        sqlx::query_as::<_, DealershipRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<DealershipRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dealerships WHERE name = $1");
        sqlx::query_as::<_, DealershipRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert the dealership and its owner membership in one statement, so a
    /// rejected owner leaves no dealership behind.
    pub async fn create_with_owner(
        pool: &PgPool,
        input: &DealershipInput,
        owner_id: DbId,
    ) -> Result<DealershipRow, sqlx::Error> {
        let query = format!(
            "WITH d AS (
                INSERT INTO dealerships (name, description, logo)
                VALUES ($1, $2, $3)
                RETURNING {COLUMNS}
             ), owner AS (
                INSERT INTO dealership_members (account_id, dealership_id, role)
                SELECT $4, d.id, 'owner' FROM d
             )
             SELECT {COLUMNS} FROM d"
        );
        sqlx::query_as::<_, DealershipRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.logo)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field. Returns `None` if missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &DealershipInput,
    ) -> Result<Option<DealershipRow>, sqlx::Error> {
        let query = format!(
            "UPDATE dealerships SET
                name = $2,
                description = $3,
                logo = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DealershipRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.logo)
            .fetch_optional(pool)
            .await
    }

    /// Delete a dealership. Memberships go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dealerships WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct MemberRepo;

impl MemberRepo {
    pub async fn list(pool: &PgPool, dealership_id: DbId) -> Result<Vec<MemberRow>, sqlx::Error> {
        let query = format!(
            "SELECT m.account_id, m.dealership_id, a.username, m.role, m.joined_at
             FROM dealership_members m
             JOIN accounts a ON a.id = m.account_id
             WHERE m.dealership_id = $1
             ORDER BY {MEMBER_ORDER}"
        );
        sqlx::query_as::<_, MemberRow>(&query)
            .bind(dealership_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Option<MemberRow>, sqlx::Error> {
        sqlx::query_as::<_, MemberRow>(
            "SELECT m.account_id, m.dealership_id, a.username, m.role, m.joined_at
             FROM dealership_members m
             JOIN accounts a ON a.id = m.account_id
             WHERE m.account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn add(
        pool: &PgPool,
        dealership_id: DbId,
        account_id: DbId,
        role: &str,
    ) -> Result<MemberRow, sqlx::Error> {
        sqlx::query_as::<_, MemberRow>(
            "WITH m AS (
                INSERT INTO dealership_members (account_id, dealership_id, role)
                VALUES ($1, $2, $3)
                RETURNING account_id, dealership_id, role, joined_at
             )
             SELECT m.account_id, m.dealership_id, a.username, m.role, m.joined_at
             FROM m
             JOIN accounts a ON a.id = m.account_id",
        )
        .bind(account_id)
        .bind(dealership_id)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    pub async fn remove(
        pool: &PgPool,
        dealership_id: DbId,
        account_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM dealership_members WHERE dealership_id = $1 AND account_id = $2",
        )
        .bind(dealership_id)
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
