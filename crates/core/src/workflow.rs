//! Confirmation workflow for email and password changes.
//!
//! Per slot: `Idle -> Pending -> {Applied, Expired, Invalid} -> Idle`.
//!
//! The request-stage notification is mandatory: if it cannot be sent the
//! staged slot is withdrawn and the request fails. Applied-stage
//! notifications are best effort and only logged on failure.

use crate::account::{Account, ChangeKind};
use crate::accounts::normalize_email;
use crate::authorization::require_self_or;
use crate::capability::Capability;
use crate::error::CoreError;
use crate::notify::{Notification, Notifier};
use crate::password::{check_password_policy, hash_password, verify_password};
use crate::pending::{AppliedChange, PendingChangeLedger, StagedChange};
use crate::principal::Principal;
use crate::store::Store;
use crate::tokens::confirmation_link;
use crate::types::DbId;

pub struct ConfirmationWorkflow<'a, S: ?Sized, N: ?Sized> {
    store: &'a S,
    notifier: &'a N,
    base_url: &'a str,
}

impl<'a, S, N> ConfirmationWorkflow<'a, S, N>
where
    S: Store + ?Sized,
    N: Notifier + ?Sized,
{
    /// `base_url` is the public origin used to build confirmation links.
    pub fn new(store: &'a S, notifier: &'a N, base_url: &'a str) -> Self {
        Self {
            store,
            notifier,
            base_url,
        }
    }

    fn ledger(&self) -> PendingChangeLedger<'a, S> {
        PendingChangeLedger::new(self.store)
    }

    async fn load(&self, id: DbId) -> Result<Account, CoreError> {
        self.store
            .find_account(id)
            .await?
            .ok_or_else(|| CoreError::not_found("account", id))
    }

    // -----------------------------------------------------------------------
    // Idle -> Pending
    // -----------------------------------------------------------------------

    /// Stage an email change on `target_id`.
    ///
    /// Changing another account's email requires `ManageUsers`. The link goes
    /// to the current address, or to the new one when the account has none.
    pub async fn request_email_change(
        &self,
        actor: &Principal,
        target_id: DbId,
        new_email: &str,
    ) -> Result<StagedChange, CoreError> {
        require_self_or(actor, target_id, Capability::ManageUsers)?;
        let new_email = normalize_email(new_email)?;
        let account = self.load(target_id).await?;

        if account.email.as_deref() == Some(new_email.as_str()) {
            return Err(CoreError::Validation(
                "new email is identical to the current one".into(),
            ));
        }
        if self.store.find_account_by_email(&new_email).await?.is_some() {
            return Err(CoreError::DuplicateName(format!("email '{new_email}'")));
        }

        let staged = self
            .ledger()
            .request(account.id, ChangeKind::Email, new_email.clone())
            .await?;

        let recipient = account.email.clone().unwrap_or_else(|| new_email.clone());
        let notification = Notification::EmailChangeRequested {
            username: account.username.clone(),
            new_email,
            link: confirmation_link(self.base_url, ChangeKind::Email, &staged.token),
        };
        self.notify_or_withdraw(&account, ChangeKind::Email, &staged, &recipient, &notification)
            .await?;

        tracing::info!(
            account_id = account.id,
            actor = actor.account_id,
            "Email change requested",
        );
        Ok(staged)
    }

    /// Stage a password change on `target_id`.
    ///
    /// Self-service requires `current_password`. Acting on another account
    /// requires `ManageUsers` instead. The staged value is the new hash.
    pub async fn request_password_change(
        &self,
        actor: &Principal,
        target_id: DbId,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<StagedChange, CoreError> {
        require_self_or(actor, target_id, Capability::ManageUsers)?;
        check_password_policy(new_password)?;
        let account = self.load(target_id).await?;

        if actor.account_id == target_id {
            let current = current_password.ok_or_else(|| {
                CoreError::Validation("current password is required".into())
            })?;
            if !verify_password(current, &account.password_hash)? {
                return Err(CoreError::Validation("current password is incorrect".into()));
            }
        }

        let recipient = account.email.clone().ok_or_else(|| {
            CoreError::Validation("account has no email address to confirm the change".into())
        })?;

        let new_hash = hash_password(new_password)?;
        let staged = self
            .ledger()
            .request(account.id, ChangeKind::Password, new_hash)
            .await?;

        let notification = Notification::PasswordChangeRequested {
            username: account.username.clone(),
            link: confirmation_link(self.base_url, ChangeKind::Password, &staged.token),
        };
        self.notify_or_withdraw(&account, ChangeKind::Password, &staged, &recipient, &notification)
            .await?;

        tracing::info!(
            account_id = account.id,
            actor = actor.account_id,
            "Password change requested",
        );
        Ok(staged)
    }

    async fn notify_or_withdraw(
        &self,
        account: &Account,
        kind: ChangeKind,
        staged: &StagedChange,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), CoreError> {
        let Err(err) = self.notifier.send(recipient, notification).await else {
            return Ok(());
        };

        tracing::error!(
            account_id = account.id,
            %kind,
            error = %err,
            "Request notification failed, withdrawing staged change",
        );
        self.ledger()
            .withdraw(account.id, kind, &staged.token)
            .await?;
        Err(CoreError::Notification(err.0))
    }

    // -----------------------------------------------------------------------
    // Pending -> Applied / Expired / Invalid
    // -----------------------------------------------------------------------

    /// Confirm a staged change of either kind.
    pub async fn confirm(&self, kind: ChangeKind, token: &str) -> Result<AppliedChange, CoreError> {
        match kind {
            ChangeKind::Email => self.confirm_email(token).await,
            ChangeKind::Password => self.confirm_password(token).await,
        }
    }

    /// Apply a staged email change and notify both the old and new address.
    pub async fn confirm_email(&self, token: &str) -> Result<AppliedChange, CoreError> {
        let applied = self.ledger().confirm(ChangeKind::Email, token).await?;

        if let Some(new_email) = applied.account.email.clone() {
            let old_email = applied.previous_email.clone();
            let notification = Notification::EmailChanged {
                username: applied.account.username.clone(),
                old_email: old_email.clone().unwrap_or_default(),
                new_email: new_email.clone(),
            };
            let recipients = old_email.into_iter().chain(std::iter::once(new_email));
            for address in recipients {
                self.notify_best_effort(applied.account.id, &address, &notification)
                    .await;
            }
        }
        Ok(applied)
    }

    /// Apply a staged password change and notify the account's address.
    pub async fn confirm_password(&self, token: &str) -> Result<AppliedChange, CoreError> {
        let applied = self.ledger().confirm(ChangeKind::Password, token).await?;

        if let Some(address) = applied.account.email.as_deref() {
            let notification = Notification::PasswordChanged {
                username: applied.account.username.clone(),
            };
            self.notify_best_effort(applied.account.id, address, &notification)
                .await;
        }
        Ok(applied)
    }

    async fn notify_best_effort(&self, account_id: DbId, address: &str, notification: &Notification) {
        if let Err(err) = self.notifier.send(address, notification).await {
            tracing::warn!(
                account_id,
                kind = notification.kind(),
                error = %err,
                "Post-change notification failed",
            );
        }
    }
}
