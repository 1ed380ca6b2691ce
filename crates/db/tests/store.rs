//! Integration tests for the PostgreSQL store.
//!
//! These need a live database (`DATABASE_URL`); run with
//! `cargo test -p a4l-db -- --ignored`.

use a4l_core::account::{ChangeKind, NewAccount, PendingChange};
use a4l_core::authorization::MembershipRole;
use a4l_core::capability::{Capability, CapabilityFlags};
use a4l_core::catalog::{BrandInput, VehicleInput};
use a4l_core::dealership::DealershipInput;
use a4l_core::roles::{system_roles, NewRole, RoleUpdate};
use a4l_core::site::SiteSettings;
use a4l_core::store::{
    AccountStore, CatalogStore, DealershipStore, RoleStore, SettingsStore, Store, StoreError,
};
use a4l_db::PgStore;
use chrono::{Duration, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_account(username: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        password_hash: "hash".to_string(),
        role_id: None,
        is_verified: true,
        verification_code: None,
        code_expires_at: None,
    }
}

fn new_brand(name: &str) -> BrandInput {
    BrandInput {
        name: name.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_ensure_role_is_idempotent(pool: PgPool) {
    let store = PgStore::new(pool);
    store.ping().await.unwrap();

    for role in system_roles() {
        store.ensure_role(&role).await.unwrap();
    }
    for role in system_roles() {
        store.ensure_role(&role).await.unwrap();
    }

    let roles = store.list_roles().await.unwrap();
    assert_eq!(roles.len(), 3);
    assert!(roles.iter().all(|r| r.role.is_system));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_role_flags_round_trip_and_rename(pool: PgPool) {
    let store = PgStore::new(pool);
    let flags = CapabilityFlags::NONE
        .with(Capability::EditBrands)
        .with(Capability::Import);
    let role = store
        .create_role(&NewRole {
            name: "editor".into(),
            flags,
            is_system: false,
        })
        .await
        .unwrap();
    assert_eq!(role.flags, flags);

    let updated = store
        .update_role(
            role.id,
            &RoleUpdate {
                name: Some("catalog".into()),
                flags: CapabilityFlags::NONE,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "catalog");
    assert_eq!(updated.flags, CapabilityFlags::NONE);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_delete_role_detaches_accounts(pool: PgPool) {
    let store = PgStore::new(pool);
    let role = store
        .create_role(&NewRole {
            name: "temp".into(),
            flags: CapabilityFlags::NONE,
            is_system: false,
        })
        .await
        .unwrap();
    let account = store.create_account(&new_account("alice")).await.unwrap();
    store.assign_role(account.id, Some(role.id)).await.unwrap();

    assert!(store.delete_role(role.id).await.unwrap());
    let account = store.find_account(account.id).await.unwrap().unwrap();
    assert_eq!(account.role_id, None);
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_duplicate_username_reports_constraint(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_account(&new_account("bob")).await.unwrap();

    let mut dup = new_account("bob");
    dup.email = Some("other@example.com".into());
    let err = store.create_account(&dup).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref c) if c == "uq_accounts_username"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_assign_missing_role_is_missing_reference(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = store.create_account(&new_account("carol")).await.unwrap();
    let err = store.assign_role(account.id, Some(9999)).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_apply_pending_requires_matching_token(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = store.create_account(&new_account("dave")).await.unwrap();
    let expires = Utc::now() + Duration::minutes(60);

    let first = PendingChange::staged("hash-1".into(), "first@example.com".into(), expires);
    let second = PendingChange::staged("hash-2".into(), "second@example.com".into(), expires);
    store
        .write_pending(account.id, ChangeKind::Email, Some(&first))
        .await
        .unwrap();
    store
        .write_pending(account.id, ChangeKind::Email, Some(&second))
        .await
        .unwrap();

    let stale = store
        .apply_pending(account.id, ChangeKind::Email, "hash-1")
        .await
        .unwrap();
    assert!(stale.is_none());

    let found = store
        .find_account_by_pending_token(ChangeKind::Email, "hash-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, account.id);

    let applied = store
        .apply_pending(account.id, ChangeKind::Email, "hash-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applied.email.as_deref(), Some("second@example.com"));
    assert!(applied.email_change.is_none());

    let again = store
        .apply_pending(account.id, ChangeKind::Email, "hash-2")
        .await
        .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_password_slot_is_independent_of_email_slot(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = store.create_account(&new_account("erin")).await.unwrap();
    let expires = Utc::now() + Duration::minutes(60);

    store
        .write_pending(
            account.id,
            ChangeKind::Email,
            Some(&PendingChange::staged("e".into(), "new@example.com".into(), expires)),
        )
        .await
        .unwrap();
    store
        .write_pending(
            account.id,
            ChangeKind::Password,
            Some(&PendingChange::staged("p".into(), "new-hash".into(), expires)),
        )
        .await
        .unwrap();

    let applied = store
        .apply_pending(account.id, ChangeKind::Password, "p")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applied.password_hash, "new-hash");
    assert!(applied.email_change.is_some());

    assert!(!store
        .clear_pending_if(account.id, ChangeKind::Email, "wrong")
        .await
        .unwrap());
    assert!(store
        .clear_pending_if(account.id, ChangeKind::Email, "e")
        .await
        .unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_verification_counter(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut input = new_account("frank");
    input.is_verified = false;
    let account = store.create_account(&input).await.unwrap();

    let expires = Utc::now() + Duration::minutes(10);
    store
        .store_verification_code(account.id, "123456", expires)
        .await
        .unwrap();
    assert_eq!(
        store.record_verification_failure(account.id).await.unwrap(),
        Some(1)
    );
    assert_eq!(
        store.record_verification_failure(account.id).await.unwrap(),
        Some(2)
    );

    store
        .store_verification_code(account.id, "654321", expires)
        .await
        .unwrap();
    let account = store.find_account(account.id).await.unwrap().unwrap();
    assert_eq!(account.verification_attempts, 0);

    assert!(store.mark_verified(account.id).await.unwrap());
    let account = store.find_account(account.id).await.unwrap().unwrap();
    assert!(account.is_verified);
    assert_eq!(account.verification_code, None);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_brand_delete_cascades_to_vehicles(pool: PgPool) {
    let store = PgStore::new(pool);
    let brand = store.create_brand(&new_brand("Annis")).await.unwrap();
    let vehicle = store
        .create_vehicle(&VehicleInput {
            brand_id: brand.id,
            name: "Elegy".into(),
            price: 95_000,
            images: vec!["a.png".into(), "b.png".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(vehicle.images.len(), 2);

    let brands = store.list_brands().await.unwrap();
    assert_eq!(brands[0].vehicle_count, 1);

    assert!(store.delete_brand(brand.id).await.unwrap());
    assert!(store.find_vehicle(vehicle.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_vehicle_list_filters_by_brand(pool: PgPool) {
    let store = PgStore::new(pool);
    let a = store.create_brand(&new_brand("Albany")).await.unwrap();
    let b = store.create_brand(&new_brand("Benefactor")).await.unwrap();
    for (brand_id, name) in [(a.id, "Virgo"), (a.id, "Emperor"), (b.id, "Schafter")] {
        store
            .create_vehicle(&VehicleInput {
                brand_id,
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let names: Vec<_> = store
        .list_vehicles(Some(a.id))
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, vec!["Emperor", "Virgo"]);
    assert_eq!(store.list_vehicles(None).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_vehicle_for_missing_brand_is_missing_reference(pool: PgPool) {
    let store = PgStore::new(pool);
    let err = store
        .create_vehicle(&VehicleInput {
            brand_id: 4242,
            name: "Ghost".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingReference(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_partial_pending_slot_is_rejected(pool: PgPool) {
    let store = PgStore::new(pool);
    let account = store.create_account(&new_account("alice")).await.unwrap();
    let partial = PendingChange {
        token_hash: "h".into(),
        value: None,
        expires_at: Some(Utc::now()),
    };

    let result = store
        .write_pending(account.id, ChangeKind::Email, Some(&partial))
        .await;

    assert!(matches!(result, Err(StoreError::Backend(_))));
}

// ---------------------------------------------------------------------------
// Dealerships
// ---------------------------------------------------------------------------

fn new_dealership(name: &str) -> DealershipInput {
    DealershipInput {
        name: name.to_string(),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_dealership_is_created_with_its_owner(pool: PgPool) {
    let store = PgStore::new(pool);
    let olga = store.create_account(&new_account("olga")).await.unwrap();
    let mia = store.create_account(&new_account("mia")).await.unwrap();

    let dealership = store
        .create_dealership(&new_dealership("Premium Deluxe"), olga.id)
        .await
        .unwrap();
    store
        .add_member(dealership.id, mia.id, MembershipRole::Employee)
        .await
        .unwrap();

    let listed = store.list_dealerships().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].member_count, 2);
    assert_eq!(listed[0].owner.as_ref().map(|o| o.account_id), Some(olga.id));

    let members = store.list_members(dealership.id).await.unwrap();
    let roles: Vec<_> = members.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MembershipRole::Owner, MembershipRole::Employee]);
    let membership = store.membership_of(mia.id).await.unwrap().unwrap();
    assert_eq!(membership.dealership_id, dealership.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_rejected_owner_leaves_no_dealership(pool: PgPool) {
    let store = PgStore::new(pool);
    let olga = store.create_account(&new_account("olga")).await.unwrap();
    store
        .create_dealership(&new_dealership("First"), olga.id)
        .await
        .unwrap();

    let second = store.create_dealership(&new_dealership("Second"), olga.id).await;

    assert!(matches!(
        second,
        Err(StoreError::Conflict(c)) if c == "uq_dealership_members_account"
    ));
    assert!(store.find_dealership_by_name("Second").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_deleting_owner_account_orphans_dealership(pool: PgPool) {
    let store = PgStore::new(pool);
    let olga = store.create_account(&new_account("olga")).await.unwrap();
    let dealership = store
        .create_dealership(&new_dealership("Premium Deluxe"), olga.id)
        .await
        .unwrap();

    store.delete_account(olga.id).await.unwrap();

    let listed = store.list_dealerships().await.unwrap();
    assert!(listed[0].owner.is_none());
    assert_eq!(listed[0].member_count, 0);
    assert!(store.delete_dealership(dealership.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn test_site_settings_upsert(pool: PgPool) {
    let store = PgStore::new(pool);
    assert_eq!(store.site_settings().await.unwrap(), SiteSettings::default());

    let first = SiteSettings {
        site_logo: Some("/logo.webp".into()),
        site_favicon: Some("/favicon.ico".into()),
    };
    store.save_site_settings(&first).await.unwrap();
    let second = SiteSettings {
        site_logo: None,
        ..first.clone()
    };
    store.save_site_settings(&second).await.unwrap();

    assert_eq!(store.site_settings().await.unwrap(), second);
}
