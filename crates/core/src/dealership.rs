//! Player-run dealerships and their members.
//!
//! Every dealership has exactly one owner, set when an administrator creates
//! it. Owners add managers and employees; owners and managers edit the
//! dealership's profile. An account belongs to at most one dealership.
//! Holding [`Capability::ManageDealerships`] overrides every membership check.

use serde::{Deserialize, Serialize};

use crate::authorization::{require, require_membership, MembershipRole};
use crate::capability::Capability;
use crate::error::CoreError;
use crate::principal::Principal;
use crate::store::Store;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dealership {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One account's place in a dealership, as listed to others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub account_id: DbId,
    pub username: String,
    pub role: MembershipRole,
    pub joined_at: Timestamp,
}

/// The dealership an account belongs to, and as what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub dealership_id: DbId,
    pub role: MembershipRole,
}

/// List entry: the dealership with its owner (absent once the owner's
/// account is deleted) and head count.
#[derive(Debug, Clone, Serialize)]
pub struct DealershipSummary {
    #[serde(flatten)]
    pub dealership: Dealership,
    pub owner: Option<Member>,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealershipDetail {
    #[serde(flatten)]
    pub dealership: Dealership,
    pub members: Vec<Member>,
}

/// The caller's own dealership, with the role they hold there.
#[derive(Debug, Clone, Serialize)]
pub struct MyDealership {
    #[serde(flatten)]
    pub dealership: Dealership,
    pub role: MembershipRole,
    pub members: Vec<Member>,
}

/// Full set of editable fields, as written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DealershipInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Partial edit. Absent fields keep their value; a blank description or
/// logo clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealershipUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn validate_dealership(input: &DealershipInput) -> Result<DealershipInput, CoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("dealership name is required".into()));
    }
    Ok(DealershipInput {
        name: name.to_string(),
        description: blank_to_none(input.description.as_deref()),
        logo: blank_to_none(input.logo.as_deref()),
    })
}

fn merge(current: &Dealership, update: &DealershipUpdate) -> DealershipInput {
    DealershipInput {
        name: update.name.clone().unwrap_or_else(|| current.name.clone()),
        description: update
            .description
            .clone()
            .or_else(|| current.description.clone()),
        logo: update.logo.clone().or_else(|| current.logo.clone()),
    }
}

pub struct DealershipService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> DealershipService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<DealershipSummary>, CoreError> {
        Ok(self.store.list_dealerships().await?)
    }

    pub async fn get(&self, id: DbId) -> Result<DealershipDetail, CoreError> {
        let dealership = self.load(id).await?;
        let members = self.store.list_members(id).await?;
        Ok(DealershipDetail { dealership, members })
    }

    /// The dealership the actor owns or manages.
    pub async fn mine(&self, actor: &Principal) -> Result<MyDealership, CoreError> {
        let membership = self
            .store
            .membership_of(actor.account_id)
            .await?
            .filter(|m| matches!(m.role, MembershipRole::Owner | MembershipRole::Manager))
            .ok_or_else(|| {
                CoreError::not_found("dealership", format!("managed by account {}", actor.account_id))
            })?;
        let dealership = self.load(membership.dealership_id).await?;
        let members = self.store.list_members(dealership.id).await?;
        Ok(MyDealership {
            dealership,
            role: membership.role,
            members,
        })
    }

    /// Create a dealership owned by `owner_id`.
    pub async fn create(
        &self,
        actor: &Principal,
        input: &DealershipInput,
        owner_id: DbId,
    ) -> Result<DealershipSummary, CoreError> {
        require(actor, Capability::ManageDealerships)?;
        let input = validate_dealership(input)?;
        self.ensure_unaffiliated(owner_id).await?;
        if self.store.find_dealership_by_name(&input.name).await?.is_some() {
            return Err(CoreError::DuplicateName(format!("dealership '{}'", input.name)));
        }

        let dealership = self.store.create_dealership(&input, owner_id).await?;
        tracing::info!(
            dealership_id = dealership.id,
            owner_id,
            actor = actor.account_id,
            "Dealership created",
        );
        let owner = self
            .store
            .list_members(dealership.id)
            .await?
            .into_iter()
            .find(|m| m.role == MembershipRole::Owner);
        Ok(DealershipSummary {
            dealership,
            owner,
            member_count: 1,
        })
    }

    /// Edit the dealership's profile. Owners and managers may do this.
    pub async fn update(
        &self,
        actor: &Principal,
        id: DbId,
        update: &DealershipUpdate,
    ) -> Result<Dealership, CoreError> {
        let current = self.load(id).await?;
        let role = self.role_in(actor.account_id, id).await?;
        require_membership(
            actor,
            Capability::ManageDealerships,
            role,
            &[MembershipRole::Owner, MembershipRole::Manager],
        )?;

        let input = validate_dealership(&merge(&current, update))?;
        if let Some(other) = self.store.find_dealership_by_name(&input.name).await? {
            if other.id != id {
                return Err(CoreError::DuplicateName(format!("dealership '{}'", input.name)));
            }
        }
        let dealership = self
            .store
            .update_dealership(id, &input)
            .await?
            .ok_or_else(|| CoreError::not_found("dealership", id))?;
        tracing::debug!(dealership_id = id, actor = actor.account_id, "Dealership updated");
        Ok(dealership)
    }

    /// Delete a dealership and all of its memberships.
    pub async fn delete(&self, actor: &Principal, id: DbId) -> Result<(), CoreError> {
        require(actor, Capability::ManageDealerships)?;
        if !self.store.delete_dealership(id).await? {
            return Err(CoreError::not_found("dealership", id));
        }
        tracing::info!(dealership_id = id, actor = actor.account_id, "Dealership deleted");
        Ok(())
    }

    /// Add a manager or employee. Only the owner may do this.
    pub async fn add_member(
        &self,
        actor: &Principal,
        id: DbId,
        account_id: DbId,
        role: MembershipRole,
    ) -> Result<Member, CoreError> {
        self.load(id).await?;
        let actor_role = self.role_in(actor.account_id, id).await?;
        require_membership(
            actor,
            Capability::ManageDealerships,
            actor_role,
            &[MembershipRole::Owner],
        )?;
        if role == MembershipRole::Owner {
            return Err(CoreError::Validation(
                "a dealership has exactly one owner".into(),
            ));
        }
        self.ensure_unaffiliated(account_id).await?;

        let member = self.store.add_member(id, account_id, role).await?;
        tracing::info!(
            dealership_id = id,
            account_id,
            role = role.as_str(),
            actor = actor.account_id,
            "Member added",
        );
        Ok(member)
    }

    /// Remove a member. The owner removes anyone but themself; a manager
    /// removes employees only.
    pub async fn remove_member(
        &self,
        actor: &Principal,
        id: DbId,
        account_id: DbId,
    ) -> Result<(), CoreError> {
        self.load(id).await?;
        let actor_role = self.role_in(actor.account_id, id).await?;
        require_membership(
            actor,
            Capability::ManageDealerships,
            actor_role,
            &[MembershipRole::Owner, MembershipRole::Manager],
        )?;

        let target = self
            .role_in(account_id, id)
            .await?
            .ok_or_else(|| CoreError::not_found("member", account_id))?;
        if target == MembershipRole::Owner {
            return Err(CoreError::Validation(
                "the owner cannot be removed from their dealership".into(),
            ));
        }
        if !actor.can(Capability::ManageDealerships)
            && actor_role == Some(MembershipRole::Manager)
            && target != MembershipRole::Employee
        {
            return Err(CoreError::Authorization(
                "managers can only remove employees".into(),
            ));
        }

        if !self.store.remove_member(id, account_id).await? {
            return Err(CoreError::not_found("member", account_id));
        }
        tracing::info!(dealership_id = id, account_id, actor = actor.account_id, "Member removed");
        Ok(())
    }

    async fn load(&self, id: DbId) -> Result<Dealership, CoreError> {
        self.store
            .find_dealership(id)
            .await?
            .ok_or_else(|| CoreError::not_found("dealership", id))
    }

    async fn role_in(
        &self,
        account_id: DbId,
        dealership_id: DbId,
    ) -> Result<Option<MembershipRole>, CoreError> {
        Ok(self
            .store
            .membership_of(account_id)
            .await?
            .filter(|m| m.dealership_id == dealership_id)
            .map(|m| m.role))
    }

    async fn ensure_unaffiliated(&self, account_id: DbId) -> Result<(), CoreError> {
        if self.store.find_account(account_id).await?.is_none() {
            return Err(CoreError::not_found("account", account_id));
        }
        if self.store.membership_of(account_id).await?.is_some() {
            return Err(CoreError::Validation(format!(
                "account {account_id} already belongs to a dealership"
            )));
        }
        Ok(())
    }
}
