//! [`Store`] implementation backed by PostgreSQL.

use a4l_core::account::{Account, ChangeKind, NewAccount, PendingChange};
use a4l_core::authorization::MembershipRole;
use a4l_core::catalog::{Brand, BrandInput, BrandSummary, Vehicle, VehicleInput};
use a4l_core::dealership::{Dealership, DealershipInput, DealershipSummary, Member, Membership};
use a4l_core::roles::{NewRole, Role, RoleSummary, RoleUpdate};
use a4l_core::site::{SiteSettings, SITE_FAVICON_KEY, SITE_LOGO_KEY};
use a4l_core::store::{
    AccountStore, CatalogStore, DealershipStore, RoleStore, SettingsStore, Store, StoreError,
};
use a4l_core::types::{DbId, Timestamp};
use async_trait::async_trait;

use crate::models::dealership::{DealershipSummaryRow, MemberRow};
use crate::repositories::{
    AccountRepo, BrandRepo, DealershipRepo, MemberRepo, RoleRepo, SettingsRepo, VehicleRepo,
};
use crate::DbPool;

/// PostgreSQL unique violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a sqlx error onto the storage-agnostic [`StoreError`].
///
/// Constraint violations carry the constraint name so callers can tell which
/// field collided.
fn store_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Conflict(constraint),
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::MissingReference(constraint),
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

fn member_role(raw: &str) -> Result<MembershipRole, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Backend(format!("unknown membership role '{raw}' in storage")))
}

fn member_from(row: MemberRow) -> Result<Member, StoreError> {
    Ok(Member {
        role: member_role(&row.role)?,
        account_id: row.account_id,
        username: row.username,
        joined_at: row.joined_at,
    })
}

fn summary_from(row: DealershipSummaryRow) -> DealershipSummary {
    let owner = match (row.owner_id, row.owner_username, row.owner_joined_at) {
        (Some(account_id), Some(username), Some(joined_at)) => Some(Member {
            account_id,
            username,
            role: MembershipRole::Owner,
            joined_at,
        }),
        _ => None,
    };
    DealershipSummary {
        dealership: row.dealership.into(),
        owner,
        member_count: row.member_count,
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn find_role(&self, id: DbId) -> Result<Option<Role>, StoreError> {
        let row = RoleRepo::find_by_id(&self.pool, id).await.map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let row = RoleRepo::find_by_name(&self.pool, name)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_roles(&self) -> Result<Vec<RoleSummary>, StoreError> {
        let rows = RoleRepo::list_with_counts(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_role(&self, input: &NewRole) -> Result<Role, StoreError> {
        let row = RoleRepo::create(&self.pool, input).await.map_err(store_err)?;
        Ok(row.into())
    }

    async fn update_role(&self, id: DbId, input: &RoleUpdate) -> Result<Option<Role>, StoreError> {
        let row = RoleRepo::update(&self.pool, id, input.name.as_deref(), &input.flags)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn delete_role(&self, id: DbId) -> Result<bool, StoreError> {
        RoleRepo::delete(&self.pool, id).await.map_err(store_err)
    }

    async fn ensure_role(&self, input: &NewRole) -> Result<Role, StoreError> {
        let row = RoleRepo::ensure(&self.pool, input).await.map_err(store_err)?;
        Ok(row.into())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account(&self, id: DbId) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::find_by_username(&self.pool, username)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::find_by_email(&self.pool, email)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_account_by_pending_token(
        &self,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::find_by_pending_token(&self.pool, kind, token_hash)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows = AccountRepo::list(&self.pool).await.map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_account(&self, input: &NewAccount) -> Result<Account, StoreError> {
        let row = AccountRepo::create(&self.pool, input)
            .await
            .map_err(store_err)?;
        Ok(row.into())
    }

    async fn update_profile(
        &self,
        id: DbId,
        username: Option<&str>,
        theme_color: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::update_profile(&self.pool, id, username, theme_color)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn assign_role(
        &self,
        id: DbId,
        role_id: Option<DbId>,
    ) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::set_role(&self.pool, id, role_id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn delete_account(&self, id: DbId) -> Result<bool, StoreError> {
        AccountRepo::delete(&self.pool, id).await.map_err(store_err)
    }

    async fn write_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        pending: Option<&PendingChange>,
    ) -> Result<bool, StoreError> {
        AccountRepo::write_pending(&self.pool, id, kind, pending)
            .await
            .map_err(store_err)
    }

    async fn clear_pending_if(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<bool, StoreError> {
        AccountRepo::clear_pending_if(&self.pool, id, kind, token_hash)
            .await
            .map_err(store_err)
    }

    async fn apply_pending(
        &self,
        id: DbId,
        kind: ChangeKind,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = AccountRepo::apply_pending(&self.pool, id, kind, token_hash)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn store_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, StoreError> {
        AccountRepo::store_verification_code(&self.pool, id, code, expires_at)
            .await
            .map_err(store_err)
    }

    async fn record_verification_failure(&self, id: DbId) -> Result<Option<i32>, StoreError> {
        AccountRepo::increment_verification_attempts(&self.pool, id)
            .await
            .map_err(store_err)
    }

    async fn mark_verified(&self, id: DbId) -> Result<bool, StoreError> {
        AccountRepo::mark_verified(&self.pool, id)
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_brands(&self) -> Result<Vec<BrandSummary>, StoreError> {
        let rows = BrandRepo::list_with_counts(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_brand(&self, id: DbId) -> Result<Option<Brand>, StoreError> {
        let row = BrandRepo::find_by_id(&self.pool, id).await.map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        let row = BrandRepo::find_by_name(&self.pool, name)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn create_brand(&self, input: &BrandInput) -> Result<Brand, StoreError> {
        let row = BrandRepo::create(&self.pool, input).await.map_err(store_err)?;
        Ok(row.into())
    }

    async fn update_brand(
        &self,
        id: DbId,
        input: &BrandInput,
    ) -> Result<Option<Brand>, StoreError> {
        let row = BrandRepo::update(&self.pool, id, input)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn delete_brand(&self, id: DbId) -> Result<bool, StoreError> {
        BrandRepo::delete(&self.pool, id).await.map_err(store_err)
    }

    async fn list_vehicles(&self, brand_id: Option<DbId>) -> Result<Vec<Vehicle>, StoreError> {
        let rows = VehicleRepo::list(&self.pool, brand_id)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_vehicle(&self, id: DbId) -> Result<Option<Vehicle>, StoreError> {
        let row = VehicleRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, StoreError> {
        let row = VehicleRepo::create(&self.pool, input)
            .await
            .map_err(store_err)?;
        Ok(row.into())
    }

    async fn update_vehicle(
        &self,
        id: DbId,
        input: &VehicleInput,
    ) -> Result<Option<Vehicle>, StoreError> {
        let row = VehicleRepo::update(&self.pool, id, input)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn delete_vehicle(&self, id: DbId) -> Result<bool, StoreError> {
        VehicleRepo::delete(&self.pool, id).await.map_err(store_err)
    }
}

#[async_trait]
impl DealershipStore for PgStore {
    async fn list_dealerships(&self) -> Result<Vec<DealershipSummary>, StoreError> {
        let rows = DealershipRepo::list_with_owner(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(summary_from).collect())
    }

    async fn find_dealership(&self, id: DbId) -> Result<Option<Dealership>, StoreError> {
        let row = DealershipRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_dealership_by_name(&self, name: &str) -> Result<Option<Dealership>, StoreError> {
        let row = DealershipRepo::find_by_name(&self.pool, name)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn create_dealership(
        &self,
        input: &DealershipInput,
        owner_id: DbId,
    ) -> Result<Dealership, StoreError> {
        let row = DealershipRepo::create_with_owner(&self.pool, input, owner_id)
            .await
            .map_err(store_err)?;
        Ok(row.into())
    }

    async fn update_dealership(
        &self,
        id: DbId,
        input: &DealershipInput,
    ) -> Result<Option<Dealership>, StoreError> {
        let row = DealershipRepo::update(&self.pool, id, input)
            .await
            .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn delete_dealership(&self, id: DbId) -> Result<bool, StoreError> {
        DealershipRepo::delete(&self.pool, id).await.map_err(store_err)
    }

    async fn list_members(&self, dealership_id: DbId) -> Result<Vec<Member>, StoreError> {
        let rows = MemberRepo::list(&self.pool, dealership_id)
            .await
            .map_err(store_err)?;
        rows.into_iter().map(member_from).collect()
    }

    async fn membership_of(&self, account_id: DbId) -> Result<Option<Membership>, StoreError> {
        let row = MemberRepo::find_by_account(&self.pool, account_id)
            .await
            .map_err(store_err)?;
        row.map(|r| {
            Ok(Membership {
                dealership_id: r.dealership_id,
                role: member_role(&r.role)?,
            })
        })
        .transpose()
    }

    async fn add_member(
        &self,
        dealership_id: DbId,
        account_id: DbId,
        role: MembershipRole,
    ) -> Result<Member, StoreError> {
        let row = MemberRepo::add(&self.pool, dealership_id, account_id, role.as_str())
            .await
            .map_err(store_err)?;
        member_from(row)
    }

    async fn remove_member(&self, dealership_id: DbId, account_id: DbId) -> Result<bool, StoreError> {
        MemberRepo::remove(&self.pool, dealership_id, account_id)
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError> {
        let rows = SettingsRepo::find_many(&self.pool, &[SITE_LOGO_KEY, SITE_FAVICON_KEY])
            .await
            .map_err(store_err)?;
        let mut settings = SiteSettings::default();
        for row in rows {
            match row.key.as_str() {
                SITE_LOGO_KEY => settings.site_logo = row.value,
                SITE_FAVICON_KEY => settings.site_favicon = row.value,
                _ => {}
            }
        }
        Ok(settings)
    }

    async fn save_site_settings(&self, settings: &SiteSettings) -> Result<(), StoreError> {
        SettingsRepo::upsert_many(
            &self.pool,
            &[
                (SITE_LOGO_KEY, settings.site_logo.as_deref()),
                (SITE_FAVICON_KEY, settings.site_favicon.as_deref()),
            ],
        )
        .await
        .map_err(store_err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_err)
    }
}
