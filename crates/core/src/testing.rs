//! In-memory collaborators for tests.
//!
//! [`MemoryStore`] enforces the same uniqueness, foreign-key and cascade
//! rules as the PostgreSQL schema. [`RecordingNotifier`] keeps every sent
//! notification and can be switched into a failing mode.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::account::{Account, ChangeKind, NewAccount, PendingChange};
use crate::authorization::MembershipRole;
use crate::capability::CapabilityFlags;
use crate::catalog::{Brand, BrandInput, BrandSummary, Vehicle, VehicleInput};
use crate::dealership::{Dealership, DealershipInput, DealershipSummary, Member, Membership};
use crate::notify::{Notification, NotifyError, Notifier};
use crate::password::hash_password;
use crate::principal::{Principal, PrincipalResolver};
use crate::registry::RoleRegistry;
use crate::roles::{NewRole, Role, RoleSummary, RoleUpdate};
use crate::site::SiteSettings;
use crate::store::{
    AccountStore, CatalogStore, DealershipStore, RoleStore, SettingsStore, Store, StoreError,
};
use crate::types::{DbId, Timestamp};

#[derive(Default)]
struct State {
    next_id: DbId,
    roles: BTreeMap<DbId, Role>,
    accounts: BTreeMap<DbId, Account>,
    brands: BTreeMap<DbId, Brand>,
    vehicles: BTreeMap<DbId, Vehicle>,
    dealerships: BTreeMap<DbId, Dealership>,
    /// Keyed by account: one membership per account.
    memberships: BTreeMap<DbId, (Membership, Timestamp)>,
    settings: SiteSettings,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn members_of(&self, dealership_id: DbId) -> Vec<Member> {
        let mut members: Vec<_> = self
            .memberships
            .iter()
            .filter(|(_, (m, _))| m.dealership_id == dealership_id)
            .filter_map(|(account_id, (m, joined_at))| {
                self.accounts.get(account_id).map(|a| Member {
                    account_id: *account_id,
                    username: a.username.clone(),
                    role: m.role,
                    joined_at: *joined_at,
                })
            })
            .collect();
        members.sort_by_key(|m| (Reverse(m.role), m.joined_at, m.account_id));
        members
    }

    fn dealership_name_taken(&self, name: &str, except: Option<DbId>) -> bool {
        self.dealerships
            .values()
            .any(|d| d.name == name && Some(d.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<DbId>) -> bool {
        self.accounts
            .values()
            .any(|a| a.email.as_deref() == Some(email) && Some(a.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the system roles already seeded.
    pub async fn bootstrapped() -> Self {
        let store = Self::new();
        RoleRegistry::new(&store)
            .bootstrap()
            .await
            .expect("seeding an empty memory store cannot fail");
        store
    }

    pub async fn role_named(&self, name: &str) -> Role {
        self.find_role_by_name(name)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("role '{name}' not seeded"))
    }

    pub async fn role_count(&self) -> usize {
        self.state.lock().await.roles.len()
    }

    /// Overwrite a slot without the all-or-nothing check `write_pending`
    /// applies, the way a row edited by hand or by a migration could look.
    pub async fn force_pending_slot(&self, id: DbId, kind: ChangeKind, pending: PendingChange) {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get_mut(&id)
            .unwrap_or_else(|| panic!("account {id} not seeded"));
        *pending_slot(account, kind) = Some(pending);
    }
}

fn pending_slot(account: &mut Account, kind: ChangeKind) -> &mut Option<PendingChange> {
    match kind {
        ChangeKind::Email => &mut account.email_change,
        ChangeKind::Password => &mut account.password_change,
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_role(&self, id: DbId) -> Result<Option<Role>, StoreError> {
        Ok(self.state.lock().await.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<RoleSummary>, StoreError> {
        let state = self.state.lock().await;
        let mut roles: Vec<_> = state
            .roles
            .values()
            .map(|role| RoleSummary {
                role: role.clone(),
                account_count: state
                    .accounts
                    .values()
                    .filter(|a| a.role_id == Some(role.id))
                    .count() as i64,
            })
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn create_role(&self, input: &NewRole) -> Result<Role, StoreError> {
        let mut state = self.state.lock().await;
        if state.roles.values().any(|r| r.name == input.name) {
            return Err(StoreError::Conflict("uq_roles_name".into()));
        }
        let now = Utc::now();
        let role = Role {
            id: state.next_id(),
            name: input.name.clone(),
            flags: input.flags,
            is_system: input.is_system,
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, id: DbId, input: &RoleUpdate) -> Result<Option<Role>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(name) = &input.name {
            if state.roles.values().any(|r| &r.name == name && r.id != id) {
                return Err(StoreError::Conflict("uq_roles_name".into()));
            }
        }
        let Some(role) = state.roles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            role.name = name.clone();
        }
        role.flags = input.flags;
        role.updated_at = Utc::now();
        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.roles.remove(&id).is_none() {
            return Ok(false);
        }
        for account in state.accounts.values_mut() {
            if account.role_id == Some(id) {
                account.role_id = None;
            }
        }
        Ok(true)
    }

    async fn ensure_role(&self, input: &NewRole) -> Result<Role, StoreError> {
        if let Some(existing) = self.find_role_by_name(&input.name).await? {
            return Ok(existing);
        }
        self.create_role(input).await
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account(&self, id: DbId) -> Result<Option<Account>, StoreError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.values().find(|a| a.username == username).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_account_by_pending_token(
        &self,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.pending(kind).is_some_and(|p| p.token_hash == token_hash))
            .cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.values().rev().cloned().collect())
    }

    async fn create_account(&self, input: &NewAccount) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        if state.accounts.values().any(|a| a.username == input.username) {
            return Err(StoreError::Conflict("uq_accounts_username".into()));
        }
        if let Some(email) = &input.email {
            if state.email_taken(email, None) {
                return Err(StoreError::Conflict("uq_accounts_email".into()));
            }
        }
        if let Some(role_id) = input.role_id {
            if !state.roles.contains_key(&role_id) {
                return Err(StoreError::MissingReference("role".into()));
            }
        }

        let now = Utc::now();
        let account = Account {
            id: state.next_id(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role_id: input.role_id,
            is_verified: input.is_verified,
            verification_code: input.verification_code.clone(),
            code_expires_at: input.code_expires_at,
            verification_attempts: 0,
            theme_color: None,
            email_change: None,
            password_change: None,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_profile(
        &self,
        id: DbId,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(name) = username {
            if state.accounts.values().any(|a| a.username == name && a.id != id) {
                return Err(StoreError::Conflict("uq_accounts_username".into()));
            }
        }
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = username {
            account.username = name.to_string();
        }
        if let Some(color) = theme_color {
            account.theme_color = Some(color.to_string());
        }
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn assign_role(&self, id: DbId, role_id: Option<DbId>) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(role_id) = role_id {
            if !state.roles.contains_key(&role_id) {
                return Err(StoreError::MissingReference("role".into()));
            }
        }
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.role_id = role_id;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.memberships.remove(&id);
        Ok(state.accounts.remove(&id).is_some())
    }

    async fn write_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        pending: Option<&PendingChange>,
    ) -> Result<bool, StoreError> {
        if pending.is_some_and(|p| p.value.is_none() || p.expires_at.is_none()) {
            return Err(StoreError::Backend(format!(
                "new row violates check constraint \"ck_accounts_{kind}_change_slot\""
            )));
        }
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(false);
        };
        *pending_slot(account, kind) = pending.cloned();
        Ok(true)
    }

    async fn clear_pending_if(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(false);
        };
        let slot = pending_slot(account, kind);
        if slot.as_ref().is_some_and(|p| p.token_hash == token_hash) {
            *slot = None;
            return Ok(true);
        }
        Ok(false)
    }

    async fn apply_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.lock().await;
        let value = match state.accounts.get(&id).and_then(|a| a.pending(kind)) {
            Some(PendingChange {
                token_hash: stored,
                value: Some(value),
                ..
            }) if stored == token_hash => value.clone(),
            _ => return Ok(None),
        };
        if kind == ChangeKind::Email && state.email_taken(&value, Some(id)) {
            return Err(StoreError::Conflict("uq_accounts_email".into()));
        }

        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        match kind {
            ChangeKind::Email => account.email = Some(value),
            ChangeKind::Password => account.password_hash = value,
        }
        *pending_slot(account, kind) = None;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn store_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.verification_code = Some(code.to_string());
        account.code_expires_at = Some(expires_at);
        account.verification_attempts = 0;
        Ok(true)
    }

    async fn record_verification_failure(&self, id: DbId) -> Result<Option<i32>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.accounts.get_mut(&id).map(|account| {
            account.verification_attempts += 1;
            account.verification_attempts
        }))
    }

    async fn mark_verified(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.is_verified = true;
        account.verification_code = None;
        account.code_expires_at = None;
        account.verification_attempts = 0;
        Ok(true)
    }
}

fn brand_from(id: DbId, input: &BrandInput, created_at: Timestamp) -> Brand {
    Brand {
        id,
        name: input.name.clone(),
        logo: input.logo.clone(),
        dealership_name: input.dealership_name.clone(),
        dealership_location: input.dealership_location.clone(),
        created_at,
        updated_at: Utc::now(),
    }
}

fn vehicle_from(id: DbId, input: &VehicleInput, created_at: Timestamp) -> Vehicle {
    Vehicle {
        id,
        brand_id: input.brand_id,
        name: input.name.clone(),
        description: input.description.clone(),
        price: input.price,
        category: input.category.clone(),
        power: input.power,
        trunk: input.trunk,
        vmax: input.vmax,
        seats: input.seats,
        images: input.images.clone(),
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_brands(&self) -> Result<Vec<BrandSummary>, StoreError> {
        let state = self.state.lock().await;
        let mut brands: Vec<_> = state
            .brands
            .values()
            .map(|brand| BrandSummary {
                brand: brand.clone(),
                vehicle_count: state
                    .vehicles
                    .values()
                    .filter(|v| v.brand_id == brand.id)
                    .count() as i64,
            })
            .collect();
        brands.sort_by(|a, b| a.brand.name.cmp(&b.brand.name));
        Ok(brands)
    }

    async fn find_brand(&self, id: DbId) -> Result<Option<Brand>, StoreError> {
        Ok(self.state.lock().await.brands.get(&id).cloned())
    }

    async fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.brands.values().find(|b| b.name == name).cloned())
    }

    async fn create_brand(&self, input: &BrandInput) -> Result<Brand, StoreError> {
        let mut state = self.state.lock().await;
        if state.brands.values().any(|b| b.name == input.name) {
            return Err(StoreError::Conflict("uq_brands_name".into()));
        }
        let id = state.next_id();
        let brand = brand_from(id, input, Utc::now());
        state.brands.insert(id, brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, id: DbId, input: &BrandInput) -> Result<Option<Brand>, StoreError> {
        let mut state = self.state.lock().await;
        if state.brands.values().any(|b| b.name == input.name && b.id != id) {
            return Err(StoreError::Conflict("uq_brands_name".into()));
        }
        let Some(existing) = state.brands.get_mut(&id) else {
            return Ok(None);
        };
        *existing = brand_from(id, input, existing.created_at);
        Ok(Some(existing.clone()))
    }

    async fn delete_brand(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.brands.remove(&id).is_none() {
            return Ok(false);
        }
        state.vehicles.retain(|_, v| v.brand_id != id);
        Ok(true)
    }

    async fn list_vehicles(&self, brand_id: Option<DbId>) -> Result<Vec<Vehicle>, StoreError> {
        let state = self.state.lock().await;
        let mut vehicles: Vec<_> = state
            .vehicles
            .values()
            .filter(|v| brand_id.map_or(true, |b| v.brand_id == b))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vehicles)
    }

    async fn find_vehicle(&self, id: DbId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.state.lock().await.vehicles.get(&id).cloned())
    }

    async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, StoreError> {
        let mut state = self.state.lock().await;
        if !state.brands.contains_key(&input.brand_id) {
            return Err(StoreError::MissingReference("brand".into()));
        }
        let id = state.next_id();
        let vehicle = vehicle_from(id, input, Utc::now());
        state.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(&self, id: DbId, input: &VehicleInput) -> Result<Option<Vehicle>, StoreError> {
        let mut state = self.state.lock().await;
        if !state.brands.contains_key(&input.brand_id) {
            return Err(StoreError::MissingReference("brand".into()));
        }
        let Some(existing) = state.vehicles.get_mut(&id) else {
            return Ok(None);
        };
        *existing = vehicle_from(id, input, existing.created_at);
        Ok(Some(existing.clone()))
    }

    async fn delete_vehicle(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.vehicles.remove(&id).is_some())
    }
}

#[async_trait]
impl DealershipStore for MemoryStore {
    async fn list_dealerships(&self) -> Result<Vec<DealershipSummary>, StoreError> {
        let state = self.state.lock().await;
        let mut list: Vec<_> = state
            .dealerships
            .values()
            .map(|dealership| {
                let members = state.members_of(dealership.id);
                DealershipSummary {
                    dealership: dealership.clone(),
                    owner: members
                        .iter()
                        .find(|m| m.role == MembershipRole::Owner)
                        .cloned(),
                    member_count: members.len() as i64,
                }
            })
            .collect();
        list.sort_by(|a, b| a.dealership.name.cmp(&b.dealership.name));
        Ok(list)
    }

    async fn find_dealership(&self, id: DbId) -> Result<Option<Dealership>, StoreError> {
        Ok(self.state.lock().await.dealerships.get(&id).cloned())
    }

    async fn find_dealership_by_name(&self, name: &str) -> Result<Option<Dealership>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.dealerships.values().find(|d| d.name == name).cloned())
    }

    async fn create_dealership(
        &self,
        input: &DealershipInput,
        owner_id: DbId,
    ) -> Result<Dealership, StoreError> {
        let mut state = self.state.lock().await;
        if state.dealership_name_taken(&input.name, None) {
            return Err(StoreError::Conflict("uq_dealerships_name".into()));
        }
        if !state.accounts.contains_key(&owner_id) {
            return Err(StoreError::MissingReference("account".into()));
        }
        if state.memberships.contains_key(&owner_id) {
            return Err(StoreError::Conflict("uq_dealership_members_account".into()));
        }
        let id = state.next_id();
        let now = Utc::now();
        let dealership = Dealership {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            logo: input.logo.clone(),
            created_at: now,
            updated_at: now,
        };
        state.dealerships.insert(id, dealership.clone());
        state.memberships.insert(
            owner_id,
            (
                Membership {
                    dealership_id: id,
                    role: MembershipRole::Owner,
                },
                now,
            ),
        );
        Ok(dealership)
    }

    async fn update_dealership(
        &self,
        id: DbId,
        input: &DealershipInput,
    ) -> Result<Option<Dealership>, StoreError> {
        let mut state = self.state.lock().await;
        if state.dealership_name_taken(&input.name, Some(id)) {
            return Err(StoreError::Conflict("uq_dealerships_name".into()));
        }
        let Some(existing) = state.dealerships.get_mut(&id) else {
            return Ok(None);
        };
        existing.name = input.name.clone();
        existing.description = input.description.clone();
        existing.logo = input.logo.clone();
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete_dealership(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.memberships.retain(|_, (m, _)| m.dealership_id != id);
        Ok(state.dealerships.remove(&id).is_some())
    }

    async fn list_members(&self, dealership_id: DbId) -> Result<Vec<Member>, StoreError> {
        Ok(self.state.lock().await.members_of(dealership_id))
    }

    async fn membership_of(&self, account_id: DbId) -> Result<Option<Membership>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.memberships.get(&account_id).map(|(m, _)| *m))
    }

    async fn add_member(
        &self,
        dealership_id: DbId,
        account_id: DbId,
        role: MembershipRole,
    ) -> Result<Member, StoreError> {
        let mut state = self.state.lock().await;
        if !state.dealerships.contains_key(&dealership_id) {
            return Err(StoreError::MissingReference("dealership".into()));
        }
        let Some(username) = state.accounts.get(&account_id).map(|a| a.username.clone()) else {
            return Err(StoreError::MissingReference("account".into()));
        };
        if state.memberships.contains_key(&account_id) {
            return Err(StoreError::Conflict("uq_dealership_members_account".into()));
        }
        let joined_at = Utc::now();
        state
            .memberships
            .insert(account_id, (Membership { dealership_id, role }, joined_at));
        Ok(Member {
            account_id,
            username,
            role,
            joined_at,
        })
    }

    async fn remove_member(&self, dealership_id: DbId, account_id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let is_member = state
            .memberships
            .get(&account_id)
            .is_some_and(|(m, _)| m.dealership_id == dealership_id);
        if is_member {
            state.memberships.remove(&account_id);
        }
        Ok(is_member)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError> {
        Ok(self.state.lock().await.settings.clone())
    }

    async fn save_site_settings(&self, settings: &SiteSettings) -> Result<(), StoreError> {
        self.state.lock().await.settings = settings.clone();
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Records every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every send fails without recording.
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(address, notification)` pairs in send order.
    pub async fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().await.clone()
    }

    /// Token of the most recent confirmation link sent, if any.
    pub async fn last_token(&self) -> Option<String> {
        self.sent.lock().await.iter().rev().find_map(|(_, n)| match n {
            Notification::EmailChangeRequested { link, .. }
            | Notification::PasswordChangeRequested { link, .. } => Some(token_from_link(link)),
            _ => None,
        })
    }

    /// Code of the most recent verification notification sent to `address`.
    pub async fn last_code(&self, address: &str) -> Option<String> {
        self.sent.lock().await.iter().rev().find_map(|(to, n)| match n {
            Notification::VerificationCode { code, .. } if to == address => Some(code.clone()),
            _ => None,
        })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, address: &str, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("recording notifier set to fail".into()));
        }
        self.sent
            .lock()
            .await
            .push((address.to_string(), notification.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the `token` query value from a confirmation link.
pub fn token_from_link(link: &str) -> String {
    link.split_once("token=")
        .map(|(_, token)| token.to_string())
        .unwrap_or_default()
}

/// Insert an account with `{username}@example.com` and the named role.
pub async fn seed_account(
    store: &MemoryStore,
    username: &str,
    password: &str,
    role: &str,
    verified: bool,
) -> Account {
    let role = store.role_named(role).await;
    store
        .create_account(&NewAccount {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: hash_password(password).expect("hashing should succeed"),
            role_id: Some(role.id),
            is_verified: verified,
            verification_code: None,
            code_expires_at: None,
        })
        .await
        .expect("seed account")
}

/// Principal of a stored account, as the session extractor would build it.
pub async fn principal_for(store: &MemoryStore, account_id: DbId) -> Principal {
    PrincipalResolver::new(store)
        .for_account(account_id)
        .await
        .expect("account should exist")
}

/// Detached principal holding exactly `flags`.
pub fn principal_with(flags: CapabilityFlags) -> Principal {
    Principal {
        account_id: 0,
        username: "tester".into(),
        role: Some("custom".into()),
        capabilities: flags,
    }
}
