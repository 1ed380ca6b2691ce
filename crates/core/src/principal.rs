//! Principal construction and credential resolution.
//!
//! The superadmin override is applied exactly once, in
//! [`effective_capabilities`]. Every downstream check is a flat flag test
//! against [`Principal::capabilities`].

use serde::Serialize;

use crate::account::Account;
use crate::capability::{Capability, CapabilityFlags};
use crate::error::CoreError;
use crate::password::{verify_password, verify_unknown_account};
use crate::roles::{Role, ROLE_ADMIN, ROLE_SUPERADMIN};
use crate::store::Store;
use crate::types::DbId;

/// Resolved identity plus its effective capability set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub account_id: DbId,
    pub username: String,
    /// Name of the account's role, `None` when no role is assigned.
    pub role: Option<String>,
    pub capabilities: CapabilityFlags,
}

impl Principal {
    pub fn new(account: &Account, role: Option<&Role>) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            role: role.map(|r| r.name.clone()),
            capabilities: effective_capabilities(role),
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.has(capability)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.as_deref() == Some(ROLE_SUPERADMIN)
    }
}

/// Merge a role's stored flags with the superadmin override.
///
/// No role means no capabilities.
pub fn effective_capabilities(role: Option<&Role>) -> CapabilityFlags {
    match role {
        None => CapabilityFlags::NONE,
        Some(role) if role.is_superadmin() => CapabilityFlags::ALL,
        Some(role) => role.flags,
    }
}

/// Roles whose accounts may sign in before verifying their email.
fn bypasses_verification(role: Option<&Role>) -> bool {
    matches!(role.map(|r| r.name.as_str()), Some(ROLE_SUPERADMIN | ROLE_ADMIN))
}

/// Builds principals from stored accounts and roles.
pub struct PrincipalResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> PrincipalResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Authenticate `username` / `password` and build the principal.
    ///
    /// Unknown users and wrong passwords both fail with
    /// [`CoreError::InvalidCredentials`]. Unverified accounts fail with
    /// [`CoreError::UnverifiedAccount`] unless their role is `superadmin` or
    /// `admin`.
    pub async fn resolve(&self, username: &str, password: &str) -> Result<Principal, CoreError> {
        let Some(account) = self.store.find_account_by_username(username).await? else {
            verify_unknown_account(password);
            tracing::debug!("Rejected login: unknown username");
            return Err(CoreError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            tracing::debug!(account_id = account.id, "Rejected login: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let role = self.role_of(&account).await?;
        if !account.is_verified && !bypasses_verification(role.as_ref()) {
            return Err(CoreError::UnverifiedAccount);
        }

        Ok(Principal::new(&account, role.as_ref()))
    }

    /// Rebuild the principal for an already authenticated account id.
    ///
    /// Used on every authenticated request so role changes take effect
    /// immediately. A deleted account fails with [`CoreError::Unauthorized`].
    pub async fn for_account(&self, account_id: DbId) -> Result<Principal, CoreError> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Account no longer exists".into()))?;
        let role = self.role_of(&account).await?;
        Ok(Principal::new(&account, role.as_ref()))
    }

    async fn role_of(&self, account: &Account) -> Result<Option<Role>, CoreError> {
        match account.role_id {
            Some(id) => Ok(self.store.find_role(id).await?),
            None => Ok(None),
        }
    }
}
