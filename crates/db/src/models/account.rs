//! Account row model.

use a4l_core::account::{Account, PendingChange};
use a4l_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `accounts` table, pending slots flattened into columns.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role_id: Option<DbId>,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub code_expires_at: Option<Timestamp>,
    pub verification_attempts: i32,
    pub theme_color: Option<String>,
    pub email_change_token_hash: Option<String>,
    pub email_change_value: Option<String>,
    pub email_change_expires_at: Option<Timestamp>,
    pub password_change_token_hash: Option<String>,
    pub password_change_value: Option<String>,
    pub password_change_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A slot exists whenever its token hash is set.
fn slot(
    token_hash: Option<String>,
    value: Option<String>,
    expires_at: Option<Timestamp>,
) -> Option<PendingChange> {
    token_hash.map(|token_hash| PendingChange {
        token_hash,
        value,
        expires_at,
    })
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role_id: row.role_id,
            is_verified: row.is_verified,
            verification_code: row.verification_code,
            code_expires_at: row.code_expires_at,
            verification_attempts: row.verification_attempts,
            theme_color: row.theme_color,
            email_change: slot(
                row.email_change_token_hash,
                row.email_change_value,
                row.email_change_expires_at,
            ),
            password_change: slot(
                row.password_change_token_hash,
                row.password_change_value,
                row.password_change_expires_at,
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
