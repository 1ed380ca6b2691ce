//! Registration verification codes with a capped number of attempts.
//!
//! Every wrong or expired submission increments the attempt counter. Once it
//! reaches [`MAX_VERIFICATION_ATTEMPTS`], every submission fails with
//! [`CoreError::AttemptsExceeded`] until a fresh code is issued, which resets
//! the counter.

use chrono::{Duration, Utc};

use crate::account::Account;
use crate::error::CoreError;
use crate::notify::{Notification, Notifier};
use crate::store::Store;
use crate::tokens::generate_verification_code;
use crate::types::Timestamp;

pub const MAX_VERIFICATION_ATTEMPTS: i32 = 5;

/// Lifetime of a verification code.
pub const VERIFICATION_CODE_TTL_MINS: i64 = 10;

/// A freshly generated code and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: Timestamp,
}

impl IssuedCode {
    pub fn generate(now: Timestamp) -> Self {
        Self {
            code: generate_verification_code(),
            expires_at: now + Duration::minutes(VERIFICATION_CODE_TTL_MINS),
        }
    }
}

pub struct VerificationService<'a, S: ?Sized, N: ?Sized> {
    store: &'a S,
    notifier: &'a N,
}

impl<'a, S, N> VerificationService<'a, S, N>
where
    S: Store + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(store: &'a S, notifier: &'a N) -> Self {
        Self { store, notifier }
    }

    async fn unverified_by_email(&self, email: &str) -> Result<Account, CoreError> {
        let account = self
            .store
            .find_account_by_email(email.trim())
            .await?
            .ok_or_else(|| CoreError::not_found("account", email.trim()))?;
        if account.is_verified {
            return Err(CoreError::InvalidRequestState(
                "account is already verified".into(),
            ));
        }
        Ok(account)
    }

    /// Send `code` to `address`.
    pub async fn send_code(
        &self,
        address: &str,
        username: &str,
        code: &str,
    ) -> Result<(), CoreError> {
        let notification = Notification::VerificationCode {
            username: username.to_string(),
            code: code.to_string(),
        };
        self.notifier
            .send(address, &notification)
            .await
            .map_err(|e| CoreError::Notification(e.0))
    }

    /// Issue a fresh code for the unverified account registered under
    /// `email`, reset its attempts, and send it.
    ///
    /// The new code stays stored even if sending fails.
    pub async fn resend(&self, email: &str) -> Result<IssuedCode, CoreError> {
        let account = self.unverified_by_email(email).await?;
        let issued = IssuedCode::generate(Utc::now());
        self.store
            .store_verification_code(account.id, &issued.code, issued.expires_at)
            .await?;

        let address = account.email.as_deref().unwrap_or(email);
        self.send_code(address, &account.username, &issued.code)
            .await?;
        tracing::info!(account_id = account.id, "Verification code reissued");
        Ok(issued)
    }

    pub async fn verify(&self, email: &str, code: &str) -> Result<(), CoreError> {
        self.verify_at(email, code, Utc::now()).await
    }

    /// Check `code` against the account registered under `email` as of `now`.
    pub async fn verify_at(&self, email: &str, code: &str, now: Timestamp) -> Result<(), CoreError> {
        let account = self.unverified_by_email(email).await?;

        if account.verification_attempts >= MAX_VERIFICATION_ATTEMPTS {
            return Err(CoreError::AttemptsExceeded(MAX_VERIFICATION_ATTEMPTS));
        }

        let Some(expected) = account.verification_code.as_deref() else {
            return Err(CoreError::InvalidRequestState(
                "no verification code has been issued".into(),
            ));
        };

        if account.code_expires_at.map_or(true, |at| now > at) {
            self.store.record_verification_failure(account.id).await?;
            return Err(CoreError::CodeExpired);
        }

        if expected != code.trim() {
            let attempts = self
                .store
                .record_verification_failure(account.id)
                .await?
                .unwrap_or(account.verification_attempts + 1);
            tracing::debug!(account_id = account.id, attempts, "Wrong verification code");
            return Err(CoreError::InvalidCode {
                remaining: (MAX_VERIFICATION_ATTEMPTS - attempts).max(0),
            });
        }

        self.store.mark_verified(account.id).await?;
        tracing::info!(account_id = account.id, "Account verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::store::{AccountStore, RoleStore};
    use crate::testing::{MemoryStore, RecordingNotifier};
    use crate::roles::ROLE_USER;
    use assert_matches::assert_matches;

    const EMAIL: &str = "new@x.com";

    async fn pending_account(store: &MemoryStore, code: &str, expires_at: Timestamp) -> Account {
        let role = store.find_role_by_name(ROLE_USER).await.unwrap().unwrap();
        store
            .create_account(&NewAccount {
                username: "newbie".into(),
                email: Some(EMAIL.into()),
                password_hash: "unused".into(),
                role_id: Some(role.id),
                is_verified: false,
                verification_code: Some(code.into()),
                code_expires_at: Some(expires_at),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn correct_code_verifies_and_resets() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let now = Utc::now();
        let account = pending_account(&store, "123456", now + Duration::minutes(10)).await;
        let service = VerificationService::new(&store, &notifier);

        assert_matches!(
            service.verify_at(EMAIL, "000000", now).await,
            Err(CoreError::InvalidCode { remaining: 4 })
        );
        service.verify_at(EMAIL, "123456", now).await.unwrap();

        let reloaded = store.find_account(account.id).await.unwrap().unwrap();
        assert!(reloaded.is_verified);
        assert!(reloaded.verification_code.is_none());
        assert_eq!(reloaded.verification_attempts, 0);

        assert_matches!(
            service.verify_at(EMAIL, "123456", now).await,
            Err(CoreError::InvalidRequestState(_))
        );
    }

    #[tokio::test]
    async fn sixth_attempt_fails_even_with_correct_code() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let now = Utc::now();
        pending_account(&store, "123456", now + Duration::minutes(10)).await;
        let service = VerificationService::new(&store, &notifier);

        for expected_remaining in (0..MAX_VERIFICATION_ATTEMPTS).rev() {
            assert_matches!(
                service.verify_at(EMAIL, "999999", now).await,
                Err(CoreError::InvalidCode { remaining }) if remaining == expected_remaining
            );
        }
        assert_matches!(
            service.verify_at(EMAIL, "123456", now).await,
            Err(CoreError::AttemptsExceeded(5))
        );
    }

    #[tokio::test]
    async fn resend_resets_attempts_and_sends_new_code() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let now = Utc::now();
        let account = pending_account(&store, "123456", now + Duration::minutes(10)).await;
        let service = VerificationService::new(&store, &notifier);

        for _ in 0..MAX_VERIFICATION_ATTEMPTS {
            let _ = service.verify_at(EMAIL, "999999", now).await;
        }
        let issued = service.resend(EMAIL).await.unwrap();

        let reloaded = store.find_account(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.verification_attempts, 0);
        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1,
            Notification::VerificationCode {
                username: "newbie".into(),
                code: issued.code.clone()
            }
        );

        service.verify(EMAIL, &issued.code).await.unwrap();
    }

    #[tokio::test]
    async fn expired_code_counts_as_attempt() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let now = Utc::now();
        let account = pending_account(&store, "123456", now - Duration::seconds(1)).await;
        let service = VerificationService::new(&store, &notifier);

        assert_matches!(
            service.verify_at(EMAIL, "123456", now).await,
            Err(CoreError::CodeExpired)
        );
        let reloaded = store.find_account(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.verification_attempts, 1);
    }

    #[tokio::test]
    async fn resend_send_failure_is_reported() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        pending_account(&store, "123456", Utc::now()).await;
        let service = VerificationService::new(&store, &notifier);

        notifier.fail_sends(true);
        assert_matches!(service.resend(EMAIL).await, Err(CoreError::Notification(_)));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = VerificationService::new(&store, &notifier);
        assert_matches!(
            service.verify("ghost@x.com", "123456").await,
            Err(CoreError::NotFound { .. })
        );
    }
}
