//! The pending-change ledger.
//!
//! Each account has two independent slots (email and password). A slot is
//! either empty or holds `{value, token hash, expiry}` written in one store
//! call. A new request overwrites the slot, which invalidates the previous
//! token. Confirmation is a conditional move of the staged value into the
//! account, keyed on the token hash.

use chrono::{Duration, Utc};

use crate::account::{Account, ChangeKind, PendingChange};
use crate::error::CoreError;
use crate::store::{Store, StoreError};
use crate::tokens::{generate_confirmation_token, hash_token};
use crate::types::{DbId, Timestamp};

/// Lifetime of a change request.
pub const CHANGE_REQUEST_TTL_MINS: i64 = 60;

/// Result of staging a change: the plaintext token for the confirmation link.
#[derive(Debug, Clone)]
pub struct StagedChange {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub kind: ChangeKind,
    /// The account after the change was applied.
    pub account: Account,
    /// Email address before the change (differs from `account.email` for
    /// email changes).
    pub previous_email: Option<String>,
}

pub struct PendingChangeLedger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> PendingChangeLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Stage `new_value` in the `kind` slot, replacing any earlier request.
    pub async fn request(
        &self,
        account_id: DbId,
        kind: ChangeKind,
        new_value: String,
    ) -> Result<StagedChange, CoreError> {
        self.request_at(account_id, kind, new_value, Utc::now()).await
    }

    pub async fn request_at(
        &self,
        account_id: DbId,
        kind: ChangeKind,
        new_value: String,
        now: Timestamp,
    ) -> Result<StagedChange, CoreError> {
        let token = generate_confirmation_token();
        let expires_at = now + Duration::minutes(CHANGE_REQUEST_TTL_MINS);
        let pending = PendingChange::staged(hash_token(&token), new_value, expires_at);

        if !self
            .store
            .write_pending(account_id, kind, Some(&pending))
            .await?
        {
            return Err(CoreError::not_found("account", account_id));
        }

        tracing::debug!(account_id, %kind, %expires_at, "Change staged");
        Ok(StagedChange { token, expires_at })
    }

    /// Apply the change staged under `token`.
    pub async fn confirm(&self, kind: ChangeKind, token: &str) -> Result<AppliedChange, CoreError> {
        self.confirm_at(kind, token, Utc::now()).await
    }

    /// Apply the change staged under `token` as of `now`.
    ///
    /// - unknown token: [`CoreError::TokenNotFound`]
    /// - `now` past the expiry (or no expiry): slot cleared,
    ///   [`CoreError::TokenExpired`]
    /// - no staged value: slot cleared, [`CoreError::InvalidRequestState`]
    /// - staged email taken meanwhile: slot cleared, [`CoreError::DuplicateName`]
    pub async fn confirm_at(
        &self,
        kind: ChangeKind,
        token: &str,
        now: Timestamp,
    ) -> Result<AppliedChange, CoreError> {
        if token.is_empty() {
            return Err(CoreError::TokenNotFound);
        }
        let token_hash = hash_token(token);

        let account = self
            .store
            .find_account_by_pending_token(kind, &token_hash)
            .await?
            .ok_or(CoreError::TokenNotFound)?;
        let pending = account.pending(kind).ok_or(CoreError::TokenNotFound)?;

        if pending.is_expired(now) {
            self.store
                .clear_pending_if(account.id, kind, &token_hash)
                .await?;
            tracing::info!(account_id = account.id, %kind, "Change request expired");
            return Err(CoreError::TokenExpired);
        }

        // Only rows written around `write_pending` can lack a value.
        if pending.value.is_none() {
            self.store
                .clear_pending_if(account.id, kind, &token_hash)
                .await?;
            tracing::warn!(account_id = account.id, %kind, "Pending slot had no staged value");
            return Err(CoreError::InvalidRequestState(format!(
                "no pending {kind} change"
            )));
        }

        let previous_email = account.email.clone();
        // A concurrent request may have replaced the slot since the lookup.
        let applied = match self.store.apply_pending(account.id, kind, &token_hash).await {
            Ok(applied) => applied,
            Err(StoreError::Conflict(constraint)) => {
                // The staged address was claimed by another account after the
                // request. The slot can never apply, so drop it now.
                self.store
                    .clear_pending_if(account.id, kind, &token_hash)
                    .await?;
                tracing::warn!(account_id = account.id, %kind, %constraint, "Staged value taken, request dropped");
                return Err(CoreError::DuplicateName(constraint));
            }
            Err(e) => return Err(e.into()),
        };
        let account = applied.ok_or(CoreError::TokenNotFound)?;

        tracing::info!(account_id = account.id, %kind, "Change applied");
        Ok(AppliedChange {
            kind,
            account,
            previous_email,
        })
    }

    /// Empty the `kind` slot only if it still holds `token`.
    ///
    /// Returns whether the slot was cleared; a newer request is left alone.
    pub async fn withdraw(
        &self,
        account_id: DbId,
        kind: ChangeKind,
        token: &str,
    ) -> Result<bool, CoreError> {
        Ok(self
            .store
            .clear_pending_if(account_id, kind, &hash_token(token))
            .await?)
    }
}
