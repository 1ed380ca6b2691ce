//! The role registry: named permission sets with immutable system roles.

use crate::authorization::require;
use crate::capability::{Capability, CapabilityFlags};
use crate::error::CoreError;
use crate::principal::Principal;
use crate::roles::{system_roles, NewRole, Role, RoleSummary, RoleUpdate};
use crate::store::Store;
use crate::types::DbId;

/// Maximum length of a role name, in characters.
pub const MAX_ROLE_NAME_LENGTH: usize = 50;

pub struct RoleRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> RoleRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Seed the three system roles. Safe to run on every startup.
    pub async fn bootstrap(&self) -> Result<Vec<Role>, CoreError> {
        let mut seeded = Vec::with_capacity(3);
        for role in system_roles() {
            let stored = self.store.ensure_role(&role).await?;
            seeded.push(stored);
        }
        tracing::info!(count = seeded.len(), "System roles ensured");
        Ok(seeded)
    }

    pub async fn list(&self, actor: &Principal) -> Result<Vec<RoleSummary>, CoreError> {
        require(actor, Capability::ManageRoles)?;
        Ok(self.store.list_roles().await?)
    }

    pub async fn find(&self, actor: &Principal, id: DbId) -> Result<Role, CoreError> {
        require(actor, Capability::ManageRoles)?;
        self.store
            .find_role(id)
            .await?
            .ok_or_else(|| CoreError::not_found("role", id))
    }

    /// Create a custom (non-system) role.
    pub async fn create(
        &self,
        actor: &Principal,
        name: &str,
        flags: CapabilityFlags,
    ) -> Result<Role, CoreError> {
        require(actor, Capability::ManageRoles)?;
        let name = validate_role_name(name)?;
        if self.store.find_role_by_name(&name).await?.is_some() {
            return Err(CoreError::DuplicateName(name));
        }

        let role = self
            .store
            .create_role(&NewRole {
                name,
                flags,
                is_system: false,
            })
            .await?;
        tracing::info!(role_id = role.id, name = %role.name, actor = actor.account_id, "Role created");
        Ok(role)
    }

    /// Replace a custom role's flags, optionally renaming it.
    pub async fn update(
        &self,
        actor: &Principal,
        id: DbId,
        update: &RoleUpdate,
    ) -> Result<Role, CoreError> {
        require(actor, Capability::ManageRoles)?;
        let existing = self.mutable_role(id).await?;

        let mut update = update.clone();
        if let Some(name) = update.name.take() {
            let name = validate_role_name(&name)?;
            if name != existing.name && self.store.find_role_by_name(&name).await?.is_some() {
                return Err(CoreError::DuplicateName(name));
            }
            update.name = Some(name);
        }

        let role = self
            .store
            .update_role(id, &update)
            .await?
            .ok_or_else(|| CoreError::not_found("role", id))?;
        tracing::info!(role_id = id, actor = actor.account_id, "Role updated");
        Ok(role)
    }

    /// Delete a custom role. Accounts holding it are left without a role.
    pub async fn delete(&self, actor: &Principal, id: DbId) -> Result<(), CoreError> {
        require(actor, Capability::ManageRoles)?;
        self.mutable_role(id).await?;

        if !self.store.delete_role(id).await? {
            return Err(CoreError::not_found("role", id));
        }
        tracing::info!(role_id = id, actor = actor.account_id, "Role deleted");
        Ok(())
    }

    async fn mutable_role(&self, id: DbId) -> Result<Role, CoreError> {
        let role = self
            .store
            .find_role(id)
            .await?
            .ok_or_else(|| CoreError::not_found("role", id))?;
        if role.is_system {
            return Err(CoreError::SystemRoleImmutable(role.name));
        }
        Ok(role)
    }
}

fn validate_role_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("role name is required".into()));
    }
    if name.chars().count() > MAX_ROLE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "role name must be at most {MAX_ROLE_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_SUPERADMIN, ROLE_USER};
    use crate::testing::{principal_with, MemoryStore};
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let store = MemoryStore::new();
        let registry = RoleRegistry::new(&store);
        let first = registry.bootstrap().await.unwrap();
        let second = registry.bootstrap().await.unwrap();

        let names: Vec<_> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, [ROLE_SUPERADMIN, ROLE_ADMIN, ROLE_USER]);
        assert_eq!(
            first.iter().map(|r| r.id).collect::<Vec<_>>(),
            second.iter().map(|r| r.id).collect::<Vec<_>>()
        );
        assert_eq!(store.role_count().await, 3);
    }

    #[tokio::test]
    async fn system_roles_are_immutable_even_for_superadmin() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let root = principal_with(CapabilityFlags::ALL);

        for name in [ROLE_SUPERADMIN, ROLE_ADMIN, ROLE_USER] {
            let role = store.role_named(name).await;
            let update = RoleUpdate {
                name: None,
                flags: CapabilityFlags::NONE,
            };
            assert_matches!(
                registry.update(&root, role.id, &update).await,
                Err(CoreError::SystemRoleImmutable(_))
            );
            assert_matches!(
                registry.delete(&root, role.id).await,
                Err(CoreError::SystemRoleImmutable(_))
            );
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicates_and_marks_custom() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let manager = principal_with(CapabilityFlags::NONE.with(Capability::ManageRoles));

        let role = registry
            .create(&manager, "editor", CapabilityFlags::NONE.with(Capability::EditBrands))
            .await
            .unwrap();
        assert!(!role.is_system);
        assert!(role.flags.can_edit_brands);

        assert_matches!(
            registry.create(&manager, "editor", CapabilityFlags::NONE).await,
            Err(CoreError::DuplicateName(_))
        );
        assert_matches!(
            registry.create(&manager, ROLE_ADMIN, CapabilityFlags::NONE).await,
            Err(CoreError::DuplicateName(_))
        );
    }

    #[tokio::test]
    async fn mutations_require_manage_roles() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let nobody = principal_with(CapabilityFlags::NONE);

        assert_matches!(
            registry.create(&nobody, "x", CapabilityFlags::NONE).await,
            Err(CoreError::Authorization(_))
        );
        assert_matches!(registry.list(&nobody).await, Err(CoreError::Authorization(_)));
    }

    #[tokio::test]
    async fn update_and_delete_missing_role_is_not_found() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let root = principal_with(CapabilityFlags::ALL);
        let update = RoleUpdate {
            name: Some("renamed".into()),
            flags: CapabilityFlags::NONE,
        };

        assert_matches!(
            registry.update(&root, 999, &update).await,
            Err(CoreError::NotFound { entity: "role", .. })
        );
        assert_matches!(
            registry.delete(&root, 999).await,
            Err(CoreError::NotFound { entity: "role", .. })
        );
    }

    #[tokio::test]
    async fn update_replaces_flags_and_renames() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let root = principal_with(CapabilityFlags::ALL);
        let role = registry
            .create(&root, "staff", CapabilityFlags::NONE.with(Capability::Import))
            .await
            .unwrap();

        let update = RoleUpdate {
            name: Some("  crew ".into()),
            flags: CapabilityFlags::NONE.with(Capability::EditVehicles),
        };
        let updated = registry.update(&root, role.id, &update).await.unwrap();
        assert_eq!(updated.name, "crew");
        assert_eq!(updated.flags.granted(), vec![Capability::EditVehicles]);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = MemoryStore::bootstrapped().await;
        let registry = RoleRegistry::new(&store);
        let root = principal_with(CapabilityFlags::ALL);
        assert_matches!(
            registry.create(&root, "   ", CapabilityFlags::NONE).await,
            Err(CoreError::Validation(_))
        );
    }
}
