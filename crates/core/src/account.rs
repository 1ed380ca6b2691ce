//! Account entity, pending-change slots, and DTOs.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Which pending-change slot of an account an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Email,
    Password,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Email => "email",
            ChangeKind::Password => "password",
        }
    }

    /// Path segment of the confirmation link (`/account/confirm-email`).
    pub fn confirm_path(self) -> &'static str {
        match self {
            ChangeKind::Email => "confirm-email",
            ChangeKind::Password => "confirm-password",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staged change awaiting confirmation.
///
/// Only the SHA-256 digest of the confirmation token is kept. Every write
/// populates all three fields; `value` and `expires_at` are optional only so
/// that rows left incomplete by older code paths can still be read and
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub token_hash: String,
    pub value: Option<String>,
    pub expires_at: Option<Timestamp>,
}

impl PendingChange {
    pub fn staged(token_hash: String, value: String, expires_at: Timestamp) -> Self {
        Self {
            token_hash,
            value: Some(value),
            expires_at: Some(expires_at),
        }
    }

    /// A slot with no expiry is treated as already expired.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.map_or(true, |at| now > at)
    }
}

/// Full account row.
///
/// Contains the password hash and pending slots -- never serialize this to
/// API responses directly. Use [`AccountResponse`].
#[derive(Debug, Clone)]
pub struct Account {
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
    pub email_change: Option<PendingChange>,
    pub password_change: Option<PendingChange>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn pending(&self, kind: ChangeKind) -> Option<&PendingChange> {
        match kind {
            ChangeKind::Email => self.email_change.as_ref(),
            ChangeKind::Password => self.password_change.as_ref(),
        }
    }
}

/// DTO for inserting an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role_id: Option<DbId>,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub code_expires_at: Option<Timestamp>,
}

/// Safe account representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    /// Resolved role name, `None` when the account has no role.
    pub role: Option<String>,
    pub is_verified: bool,
    pub theme_color: Option<String>,
    /// New address awaiting confirmation, if any.
    pub pending_email: Option<String>,
    pub created_at: Timestamp,
}

impl AccountResponse {
    pub fn new(account: &Account, role_name: Option<String>) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role_id: account.role_id,
            role: role_name,
            is_verified: account.is_verified,
            theme_color: account.theme_color.clone(),
            pending_email: account.email_change.as_ref().and_then(|p| p.value.clone()),
            created_at: account.created_at,
        }
    }
}
