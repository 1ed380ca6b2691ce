//! Repository for the `roles` table.

use a4l_core::capability::CapabilityFlags;
use a4l_core::roles::NewRole;
use a4l_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{RoleRow, RoleSummaryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, can_access_admin, can_edit_brands, can_edit_vehicles, \
    can_delete_brands, can_delete_vehicles, can_import, can_manage_users, \
    can_manage_roles, can_manage_dealerships, can_manage_site, is_system, \
    created_at, updated_at";

/// Flag columns in the bind order used by `create` and `update`.
const FLAG_COLUMNS: &str = "can_access_admin, can_edit_brands, can_edit_vehicles, \
    can_delete_brands, can_delete_vehicles, can_import, can_manage_users, \
    can_manage_roles, can_manage_dealerships, can_manage_site";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

/// Bind the ten capability flags in `FLAG_COLUMNS` order.
fn bind_flags<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    flags: &CapabilityFlags,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(flags.can_access_admin)
        .bind(flags.can_edit_brands)
        .bind(flags.can_edit_vehicles)
        .bind(flags.can_delete_brands)
        .bind(flags.can_delete_vehicles)
        .bind(flags.can_import)
        .bind(flags.can_manage_users)
        .bind(flags.can_manage_roles)
        .bind(flags.can_manage_dealerships)
        .bind(flags.can_manage_site)
}

impl RoleRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, RoleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<RoleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, RoleRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// All roles ordered by name, each with the number of assigned accounts.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<RoleSummaryRow>, sqlx::Error> {
        let columns = prefixed("r");
        let query = format!(
            "SELECT {columns}, COUNT(a.id) AS account_count
             FROM roles r
             LEFT JOIN accounts a ON a.role_id = r.id
             GROUP BY r.id
             ORDER BY r.name"
        );
        sqlx::query_as::<_, RoleSummaryRow>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &NewRole) -> Result<RoleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, {FLAG_COLUMNS}, is_system)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, RoleRow>(&query).bind(&input.name);
        bind_flags(q, &input.flags)
            .bind(input.is_system)
            .fetch_one(pool)
            .await
    }

    /// Replace the flags and optionally rename. Returns `None` if missing.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        flags: &CapabilityFlags,
    ) -> Result<Option<RoleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE roles SET
                name = COALESCE($2, name),
                can_access_admin = $3,
                can_edit_brands = $4,
                can_edit_vehicles = $5,
                can_delete_brands = $6,
                can_delete_vehicles = $7,
                can_import = $8,
                can_manage_users = $9,
                can_manage_roles = $10,
                can_manage_dealerships = $11,
                can_manage_site = $12,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, RoleRow>(&query).bind(id).bind(name);
        bind_flags(q, flags).fetch_optional(pool).await
    }

    /// Delete a role. Assigned accounts are detached by `ON DELETE SET NULL`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert the role unless the name exists, then return the stored row.
    pub async fn ensure(pool: &PgPool, input: &NewRole) -> Result<RoleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, {FLAG_COLUMNS}, is_system)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT ON CONSTRAINT uq_roles_name DO NOTHING
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, RoleRow>(&query).bind(&input.name);
        let inserted = bind_flags(q, &input.flags)
            .bind(input.is_system)
            .fetch_optional(pool)
            .await?;
        match inserted {
            Some(row) => Ok(row),
            None => Self::find_by_name(pool, &input.name)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }
}

/// `COLUMNS` qualified with a table alias, for joins.
fn prefixed(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
