//! Account lifecycle: registration, profile edits, deletion, and user
//! administration.
//!
//! Email and password changes do not live here; they go through
//! [`ConfirmationWorkflow`](crate::workflow::ConfirmationWorkflow).

use chrono::Utc;
use serde::Deserialize;
use validator::ValidateEmail;

use crate::account::{Account, AccountResponse, NewAccount};
use crate::authorization::require;
use crate::capability::Capability;
use crate::error::CoreError;
use crate::notify::Notifier;
use crate::password::{check_password_policy, hash_password};
use crate::principal::Principal;
use crate::roles::{Role, ROLE_SUPERADMIN, ROLE_USER};
use crate::store::Store;
use crate::theme::parse_hex_color;
use crate::types::DbId;
use crate::verification::{IssuedCode, VerificationService};

/// Maximum length of a username, in characters.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Trim and validate an email address.
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(CoreError::Validation("email is required".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!("'{email}' is not a valid email")));
    }
    Ok(email.to_string())
}

fn normalize_username(raw: &str) -> Result<String, CoreError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CoreError::Validation("username is required".into()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(username.to_string())
}

/// A validated, unwritten profile edit.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    account: Account,
    username: Option<String>,
    theme_color: Option<String>,
}

impl ProfileUpdate {
    /// The account as loaded before the edit.
    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// Input for self-registration.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct AccountService<'a, S: ?Sized, N: ?Sized> {
    store: &'a S,
    notifier: &'a N,
}

impl<'a, S, N> AccountService<'a, S, N>
where
    S: Store + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(store: &'a S, notifier: &'a N) -> Self {
        Self { store, notifier }
    }

    async fn load(&self, id: DbId) -> Result<Account, CoreError> {
        self.store
            .find_account(id)
            .await?
            .ok_or_else(|| CoreError::not_found("account", id))
    }

    async fn role_of(&self, account: &Account) -> Result<Option<Role>, CoreError> {
        match account.role_id {
            Some(id) => Ok(self.store.find_role(id).await?),
            None => Ok(None),
        }
    }

    /// Build the API view of an account, resolving its role name.
    pub async fn view(&self, account: &Account) -> Result<AccountResponse, CoreError> {
        let role = self.role_of(account).await?;
        Ok(AccountResponse::new(account, role.map(|r| r.name)))
    }

    /// The principal's own account.
    pub async fn profile(&self, actor: &Principal) -> Result<Account, CoreError> {
        self.load(actor.account_id).await
    }

    // -----------------------------------------------------------------------
    // Self-service
    // -----------------------------------------------------------------------

    /// Create an unverified `user` account and send its verification code.
    ///
    /// A failed send does not fail registration; the code can be resent.
    pub async fn register(&self, input: &Registration) -> Result<Account, CoreError> {
        let username = normalize_username(&input.username)?;
        let email = normalize_email(&input.email)?;
        check_password_policy(&input.password)?;

        if self.store.find_account_by_username(&username).await?.is_some() {
            return Err(CoreError::DuplicateName(format!("username '{username}'")));
        }
        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(CoreError::DuplicateName(format!("email '{email}'")));
        }

        let role = self.store.find_role_by_name(ROLE_USER).await?;
        let password_hash = hash_password(&input.password)?;
        let issued = IssuedCode::generate(Utc::now());

        let account = self
            .store
            .create_account(&NewAccount {
                username,
                email: Some(email.clone()),
                password_hash,
                role_id: role.map(|r| r.id),
                is_verified: false,
                verification_code: Some(issued.code.clone()),
                code_expires_at: Some(issued.expires_at),
            })
            .await?;
        tracing::info!(account_id = account.id, "Account registered");

        let verification = VerificationService::new(self.store, self.notifier);
        if let Err(e) = verification
            .send_code(&email, &account.username, &issued.code)
            .await
        {
            tracing::warn!(account_id = account.id, error = %e, "Verification code not sent");
        }
        Ok(account)
    }

    /// Update the principal's username and/or theme color.
    pub async fn update_profile(
        &self,
        actor: &Principal,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<Account, CoreError> {
        let update = self
            .prepare_profile_update(actor, username, theme_color)
            .await?;
        self.apply_profile_update(update).await
    }

    /// Validate a profile edit without writing it.
    ///
    /// Callers that combine the edit with another fallible step (staging an
    /// email change) run that step between this and
    /// [`apply_profile_update`](Self::apply_profile_update), so a rejected
    /// request leaves the account untouched.
    pub async fn prepare_profile_update(
        &self,
        actor: &Principal,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<ProfileUpdate, CoreError> {
        let account = self.load(actor.account_id).await?;

        let username = match username {
            Some(raw) => {
                let name = normalize_username(raw)?;
                if name == account.username {
                    None
                } else if self.store.find_account_by_username(&name).await?.is_some() {
                    return Err(CoreError::DuplicateName(format!("username '{name}'")));
                } else {
                    Some(name)
                }
            }
            None => None,
        };

        let theme_color = match theme_color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(color) if parse_hex_color(color).is_none() => {
                return Err(CoreError::Validation(format!(
                    "'{color}' is not a #rrggbb color"
                )));
            }
            other => other.map(str::to_string),
        };

        Ok(ProfileUpdate {
            account,
            username,
            theme_color,
        })
    }

    /// Write a prepared edit and return the account as now stored.
    pub async fn apply_profile_update(&self, update: ProfileUpdate) -> Result<Account, CoreError> {
        let id = update.account.id;
        if update.username.is_none() && update.theme_color.is_none() {
            return self.load(id).await;
        }
        let account = self
            .store
            .update_profile(id, update.username.as_deref(), update.theme_color.as_deref())
            .await?
            .ok_or_else(|| CoreError::not_found("account", id))?;
        tracing::debug!(account_id = id, "Profile updated");
        Ok(account)
    }

    /// Delete the principal's own account. Superadmins cannot delete themselves.
    pub async fn delete_self(&self, actor: &Principal) -> Result<(), CoreError> {
        if actor.is_superadmin() {
            return Err(CoreError::Authorization(
                "a superadmin account cannot be deleted".into(),
            ));
        }
        if !self.store.delete_account(actor.account_id).await? {
            return Err(CoreError::not_found("account", actor.account_id));
        }
        tracing::info!(account_id = actor.account_id, "Account deleted by owner");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    pub async fn list(&self, actor: &Principal) -> Result<Vec<AccountResponse>, CoreError> {
        require(actor, Capability::ManageUsers)?;
        let roles = self.store.list_roles().await?;
        let accounts = self.store.list_accounts().await?;

        Ok(accounts
            .iter()
            .map(|account| {
                let role_name = account.role_id.and_then(|id| {
                    roles
                        .iter()
                        .find(|r| r.role.id == id)
                        .map(|r| r.role.name.clone())
                });
                AccountResponse::new(account, role_name)
            })
            .collect())
    }

    /// Assign `role_id` to an account, or detach its role with `None`.
    pub async fn assign_role(
        &self,
        actor: &Principal,
        account_id: DbId,
        role_id: Option<DbId>,
    ) -> Result<Account, CoreError> {
        require(actor, Capability::ManageUsers)?;
        self.load(account_id).await?;
        if let Some(id) = role_id {
            self.store
                .find_role(id)
                .await?
                .ok_or_else(|| CoreError::not_found("role", id))?;
        }

        let account = self
            .store
            .assign_role(account_id, role_id)
            .await?
            .ok_or_else(|| CoreError::not_found("account", account_id))?;
        tracing::info!(account_id, ?role_id, actor = actor.account_id, "Role assigned");
        Ok(account)
    }

    /// Delete another account. Superadmin accounts are protected.
    pub async fn delete_account(&self, actor: &Principal, account_id: DbId) -> Result<(), CoreError> {
        require(actor, Capability::ManageUsers)?;
        let account = self.load(account_id).await?;
        if self.role_of(&account).await?.is_some_and(|r| r.is_superadmin()) {
            return Err(CoreError::Authorization(
                "a superadmin account cannot be deleted".into(),
            ));
        }

        if !self.store.delete_account(account_id).await? {
            return Err(CoreError::not_found("account", account_id));
        }
        tracing::info!(account_id, actor = actor.account_id, "Account deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------------

    /// Create a verified superadmin account unless the username exists.
    ///
    /// Returns `None` when the account was already present.
    pub async fn ensure_superadmin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, CoreError> {
        let username = normalize_username(username)?;
        if self.store.find_account_by_username(&username).await?.is_some() {
            return Ok(None);
        }
        let email = normalize_email(email)?;
        check_password_policy(password)?;

        let role = self
            .store
            .find_role_by_name(ROLE_SUPERADMIN)
            .await?
            .ok_or_else(|| CoreError::not_found("role", ROLE_SUPERADMIN))?;
        let password_hash = hash_password(password)?;

        let account = self
            .store
            .create_account(&NewAccount {
                username,
                email: Some(email),
                password_hash,
                role_id: Some(role.id),
                is_verified: true,
                verification_code: None,
                code_expires_at: None,
            })
            .await?;
        tracing::info!(account_id = account.id, "Superadmin account created");
        Ok(Some(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityFlags;
    use crate::notify::Notification;
    use crate::roles::ROLE_ADMIN;
    use crate::store::{AccountStore, RoleStore};
    use crate::testing::{principal_for, principal_with, seed_account, MemoryStore, RecordingNotifier};
    use assert_matches::assert_matches;

    fn registration(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_creates_unverified_user_and_sends_code() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);

        let account = service
            .register(&registration("neo", "neo@x.com", "secret1"))
            .await
            .unwrap();
        assert!(!account.is_verified);
        assert_eq!(account.verification_attempts, 0);
        assert_eq!(
            service.view(&account).await.unwrap().role.as_deref(),
            Some(ROLE_USER)
        );

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_matches!(
            &sent[0].1,
            Notification::VerificationCode { code, .. } if Some(code) == account.verification_code.as_ref()
        );
    }

    #[tokio::test]
    async fn register_survives_notification_failure() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        notifier.fail_sends(true);
        let service = AccountService::new(&store, &notifier);

        assert!(service
            .register(&registration("neo", "neo@x.com", "secret1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn register_validates_input() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        seed_account(&store, "taken", "secret1", ROLE_USER, true).await;

        assert_matches!(
            service.register(&registration("neo", "neo@x.com", "12345")).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            service.register(&registration("", "neo@x.com", "secret1")).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            service.register(&registration("neo", "nope", "secret1")).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            service.register(&registration("taken", "neo@x.com", "secret1")).await,
            Err(CoreError::DuplicateName(_))
        );
        assert_matches!(
            service
                .register(&registration("neo", "taken@example.com", "secret1"))
                .await,
            Err(CoreError::DuplicateName(_))
        );
    }

    #[tokio::test]
    async fn update_profile_checks_username_and_color() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let alice = seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        seed_account(&store, "bob", "secret1", ROLE_USER, true).await;
        let actor = principal_for(&store, alice.id).await;

        assert_matches!(
            service.update_profile(&actor, Some("bob"), None).await,
            Err(CoreError::DuplicateName(_))
        );
        assert_matches!(
            service.update_profile(&actor, None, Some("blue")).await,
            Err(CoreError::Validation(_))
        );

        let updated = service
            .update_profile(&actor, Some("alicia"), Some("#0a6496"))
            .await
            .unwrap();
        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.theme_color.as_deref(), Some("#0a6496"));
    }

    #[tokio::test]
    async fn prepared_profile_edit_is_not_written_until_applied() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let alice = seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        let actor = principal_for(&store, alice.id).await;

        let update = service
            .prepare_profile_update(&actor, Some("alice2"), None)
            .await
            .unwrap();
        assert_eq!(update.account().username, "alice");
        let stored = store.find_account(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "alice");

        let applied = service.apply_profile_update(update).await.unwrap();
        assert_eq!(applied.username, "alice2");
    }

    #[tokio::test]
    async fn superadmin_cannot_delete_itself_or_be_deleted() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let root = seed_account(&store, "root", "secret1", ROLE_SUPERADMIN, true).await;
        let as_root = principal_for(&store, root.id).await;

        assert_matches!(
            service.delete_self(&as_root).await,
            Err(CoreError::Authorization(_))
        );
        let manager = principal_with(CapabilityFlags::NONE.with(Capability::ManageUsers));
        assert_matches!(
            service.delete_account(&manager, root.id).await,
            Err(CoreError::Authorization(_))
        );
        assert!(store.find_account(root.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn user_can_delete_own_account() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let alice = seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        let actor = principal_for(&store, alice.id).await;

        service.delete_self(&actor).await.unwrap();
        assert!(store.find_account(alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn role_switch_changes_what_the_account_may_do() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let alice = seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        let bob = seed_account(&store, "bob", "secret1", ROLE_USER, true).await;

        let as_user = principal_for(&store, alice.id).await;
        assert_matches!(
            require(&as_user, Capability::EditBrands),
            Err(CoreError::Authorization(_))
        );

        let admin_role = store.find_role_by_name(ROLE_ADMIN).await.unwrap().unwrap();
        let root = principal_with(CapabilityFlags::ALL);
        service
            .assign_role(&root, alice.id, Some(admin_role.id))
            .await
            .unwrap();

        let as_admin = principal_for(&store, alice.id).await;
        assert!(require(&as_admin, Capability::EditBrands).is_ok());
        assert!(require(&as_admin, Capability::DeleteVehicles).is_ok());
        assert_matches!(
            service.assign_role(&as_admin, bob.id, None).await,
            Err(CoreError::Authorization(_))
        );
    }

    #[tokio::test]
    async fn assign_unknown_role_is_not_found() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        let alice = seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        let root = principal_with(CapabilityFlags::ALL);

        assert_matches!(
            service.assign_role(&root, alice.id, Some(777)).await,
            Err(CoreError::NotFound { entity: "role", .. })
        );
        let detached = service.assign_role(&root, alice.id, None).await.unwrap();
        assert!(detached.role_id.is_none());
    }

    #[tokio::test]
    async fn list_resolves_role_names() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);
        seed_account(&store, "alice", "secret1", ROLE_USER, true).await;
        let root = principal_with(CapabilityFlags::ALL);

        let listed = service.list(&root).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role.as_deref(), Some(ROLE_USER));
        assert_matches!(
            service.list(&principal_with(CapabilityFlags::NONE)).await,
            Err(CoreError::Authorization(_))
        );
    }

    #[tokio::test]
    async fn ensure_superadmin_is_insert_if_absent() {
        let store = MemoryStore::bootstrapped().await;
        let notifier = RecordingNotifier::new();
        let service = AccountService::new(&store, &notifier);

        let created = service
            .ensure_superadmin("root", "root@x.com", "rootpass")
            .await
            .unwrap();
        assert!(created.as_ref().is_some_and(|a| a.is_verified));
        assert!(service
            .ensure_superadmin("root", "root@x.com", "rootpass")
            .await
            .unwrap()
            .is_none());
    }
}
