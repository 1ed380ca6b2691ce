//! Repository for the `accounts` table.

use a4l_core::account::{ChangeKind, NewAccount, PendingChange};
use a4l_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::account::AccountRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role_id, is_verified, \
    verification_code, code_expires_at, verification_attempts, theme_color, \
    email_change_token_hash, email_change_value, email_change_expires_at, \
    password_change_token_hash, password_change_value, password_change_expires_at, \
    created_at, updated_at";

/// Column names backing one pending-change slot.
struct SlotColumns {
    token_hash: &'static str,
    value: &'static str,
    expires_at: &'static str,
    /// The account column the staged value replaces on confirmation.
    target: &'static str,
}

fn slot_columns(kind: ChangeKind) -> SlotColumns {
    match kind {
        ChangeKind::Email => SlotColumns {
            token_hash: "email_change_token_hash",
            value: "email_change_value",
            expires_at: "email_change_expires_at",
            target: "email",
        },
        ChangeKind::Password => SlotColumns {
            token_hash: "password_change_token_hash",
            value: "password_change_value",
            expires_at: "password_change_expires_at",
            target: "password_hash",
        },
    }
}

/// Provides CRUD and workflow operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAccount) -> Result<AccountRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts
                (username, email, password_hash, role_id, is_verified,
                 verification_code, code_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.is_verified)
            .bind(&input.verification_code)
            .bind(input.code_expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE username = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the account whose `kind` slot holds `token_hash`.
    pub async fn find_by_pending_token(
        pool: &PgPool,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let slot = slot_columns(kind);
        let query = format!(
            "SELECT {COLUMNS} FROM accounts WHERE {} = $1",
            slot.token_hash
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// List all accounts ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, AccountRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update username and/or theme color. `None` keeps the current value.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                username = COALESCE($2, username),
                theme_color = COALESCE($3, theme_color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .bind(username)
            .bind(theme_color)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the account's role.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role_id: Option<DbId>,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET role_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .bind(role_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Pending-change slots
    // -----------------------------------------------------------------------

    /// Replace the whole slot in one statement. `None` empties it.
    pub async fn write_pending(
        pool: &PgPool,
        id: DbId,
        kind: ChangeKind,
        pending: Option<&PendingChange>,
    ) -> Result<bool, sqlx::Error> {
        let slot = slot_columns(kind);
        let query = format!(
            "UPDATE accounts SET {} = $2, {} = $3, {} = $4, updated_at = NOW()
             WHERE id = $1",
            slot.token_hash, slot.value, slot.expires_at
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(pending.map(|p| p.token_hash.as_str()))
            .bind(pending.and_then(|p| p.value.as_deref()))
            .bind(pending.and_then(|p| p.expires_at))
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Empty the slot only if it still holds `token_hash`.
    pub async fn clear_pending_if(
        pool: &PgPool,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let slot = slot_columns(kind);
        let query = format!(
            "UPDATE accounts SET {hash} = NULL, {value} = NULL, {expires} = NULL,
                updated_at = NOW()
             WHERE id = $1 AND {hash} = $2",
            hash = slot.token_hash,
            value = slot.value,
            expires = slot.expires_at,
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move the staged value into its target column and empty the slot, in a
    /// single conditional statement keyed on the token hash.
    pub async fn apply_pending(
        pool: &PgPool,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let slot = slot_columns(kind);
        let query = format!(
            "UPDATE accounts SET
                {target} = {value},
                {hash} = NULL,
                {value} = NULL,
                {expires} = NULL,
                updated_at = NOW()
             WHERE id = $1 AND {hash} = $2 AND {value} IS NOT NULL
             RETURNING {COLUMNS}",
            target = slot.target,
            hash = slot.token_hash,
            value = slot.value,
            expires = slot.expires_at,
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Verification codes
    // -----------------------------------------------------------------------

    /// Store a fresh code and reset the attempt counter.
    pub async fn store_verification_code(
        pool: &PgPool,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET
                verification_code = $2,
                code_expires_at = $3,
                verification_attempts = 0,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the attempt counter by 1 and return the new value.
    pub async fn increment_verification_attempts(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE accounts SET verification_attempts = verification_attempts + 1
             WHERE id = $1
             RETURNING verification_attempts",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_verified(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET
                is_verified = true,
                verification_code = NULL,
                code_expires_at = NULL,
                verification_attempts = 0,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
