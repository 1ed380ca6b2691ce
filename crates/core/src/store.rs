//! Persistence collaborator contracts.
//!
//! Every method is a single atomic operation against one record (or one
//! conditional statement), which is all the services need: pending-slot
//! writes replace the whole slot at once, and applying a pending change is a
//! conditional move keyed on the token hash, so a slot overwritten by a newer
//! request can never be applied with the older token.

use async_trait::async_trait;

use crate::account::{Account, ChangeKind, NewAccount, PendingChange};
use crate::authorization::MembershipRole;
use crate::catalog::{Brand, BrandInput, BrandSummary, Vehicle, VehicleInput};
use crate::dealership::{Dealership, DealershipInput, DealershipSummary, Member, Membership};
use crate::roles::{NewRole, Role, RoleSummary, RoleUpdate};
use crate::site::SiteSettings;
use crate::types::{DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint or field.
    #[error("Duplicate value violates unique constraint: {0}")]
    Conflict(String),

    /// A foreign key points at a missing row.
    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role(&self, id: DbId) -> Result<Option<Role>, StoreError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;

    /// All roles ordered by name, with their account counts.
    async fn list_roles(&self) -> Result<Vec<RoleSummary>, StoreError>;

    async fn create_role(&self, input: &NewRole) -> Result<Role, StoreError>;

    /// Returns `None` if no role with `id` exists.
    async fn update_role(&self, id: DbId, input: &RoleUpdate) -> Result<Option<Role>, StoreError>;

    /// Deletes the role and detaches its accounts. Returns `false` if missing.
    async fn delete_role(&self, id: DbId) -> Result<bool, StoreError>;

    /// Insert the role unless one with the same name exists; return the stored row.
    async fn ensure_role(&self, input: &NewRole) -> Result<Role, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, id: DbId) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_username(&self, username: &str)
        -> Result<Option<Account>, StoreError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Find the account whose `kind` slot holds `token_hash`.
    async fn find_account_by_pending_token(
        &self,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// All accounts, most recently created first.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    async fn create_account(&self, input: &NewAccount) -> Result<Account, StoreError>;

    /// Update username and/or theme color. `None` fields are kept.
    async fn update_profile(
        &self,
        id: DbId,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<Option<Account>, StoreError>;

    async fn assign_role(&self, id: DbId, role_id: Option<DbId>)
        -> Result<Option<Account>, StoreError>;

    async fn delete_account(&self, id: DbId) -> Result<bool, StoreError>;

    /// Replace the whole `kind` slot (`None` empties it). Returns `false` if
    /// the account does not exist.
    async fn write_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        pending: Option<&PendingChange>,
    ) -> Result<bool, StoreError>;

    /// Empty the `kind` slot only if it still holds `token_hash`.
    async fn clear_pending_if(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<bool, StoreError>;

    /// Move the staged value of the `kind` slot into the account's real field
    /// and empty the slot, only if the slot still holds `token_hash` and a
    /// value. Returns the updated account, or `None` if nothing was applied.
    async fn apply_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Store a fresh verification code and reset the attempt counter.
    async fn store_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Increment the attempt counter, returning the new count.
    async fn record_verification_failure(&self, id: DbId) -> Result<Option<i32>, StoreError>;

    /// Mark verified, clear the code, and reset attempts.
    async fn mark_verified(&self, id: DbId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All brands ordered by name, with their vehicle counts.
    async fn list_brands(&self) -> Result<Vec<BrandSummary>, StoreError>;

    async fn find_brand(&self, id: DbId) -> Result<Option<Brand>, StoreError>;

    async fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError>;

    async fn create_brand(&self, input: &BrandInput) -> Result<Brand, StoreError>;

    async fn update_brand(&self, id: DbId, input: &BrandInput)
        -> Result<Option<Brand>, StoreError>;

    /// Deletes the brand and its vehicles.
    async fn delete_brand(&self, id: DbId) -> Result<bool, StoreError>;

    /// Vehicles ordered by name, optionally restricted to one brand.
    async fn list_vehicles(&self, brand_id: Option<DbId>) -> Result<Vec<Vehicle>, StoreError>;

    async fn find_vehicle(&self, id: DbId) -> Result<Option<Vehicle>, StoreError>;

    async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, StoreError>;

    async fn update_vehicle(
        &self,
        id: DbId,
        input: &VehicleInput,
    ) -> Result<Option<Vehicle>, StoreError>;

    async fn delete_vehicle(&self, id: DbId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait DealershipStore: Send + Sync {
    /// Every dealership with its owner and member count, by name.
    async fn list_dealerships(&self) -> Result<Vec<DealershipSummary>, StoreError>;

    async fn find_dealership(&self, id: DbId) -> Result<Option<Dealership>, StoreError>;

    async fn find_dealership_by_name(&self, name: &str)
        -> Result<Option<Dealership>, StoreError>;

    /// Insert the dealership and its owner membership together.
    async fn create_dealership(
        &self,
        input: &DealershipInput,
        owner_id: DbId,
    ) -> Result<Dealership, StoreError>;

    async fn update_dealership(
        &self,
        id: DbId,
        input: &DealershipInput,
    ) -> Result<Option<Dealership>, StoreError>;

    /// Delete the dealership; its memberships go with it.
    async fn delete_dealership(&self, id: DbId) -> Result<bool, StoreError>;

    /// Members ordered owner first, then managers, then employees.
    async fn list_members(&self, dealership_id: DbId) -> Result<Vec<Member>, StoreError>;

    async fn membership_of(&self, account_id: DbId) -> Result<Option<Membership>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the account already has a membership.
    async fn add_member(
        &self,
        dealership_id: DbId,
        account_id: DbId,
        role: MembershipRole,
    ) -> Result<Member, StoreError>;

    async fn remove_member(&self, dealership_id: DbId, account_id: DbId)
        -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError>;

    /// Upsert every setting at once.
    async fn save_site_settings(&self, settings: &SiteSettings) -> Result<(), StoreError>;
}

/// The full persistence collaborator.
#[async_trait]
pub trait Store: RoleStore + AccountStore + CatalogStore + DealershipStore + SettingsStore {
    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
