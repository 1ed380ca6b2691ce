//! The authorization guard.
//!
//! [`require`] is the single capability check invoked before every mutating
//! operation. Resource membership (`owner` / `manager` / `employee` of a
//! dealership) is a separate equality check the caller combines with it.

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::error::CoreError;
use crate::principal::Principal;
use crate::types::DbId;

/// Fail with [`CoreError::Authorization`] unless `principal` holds `capability`.
pub fn require(principal: &Principal, capability: Capability) -> Result<(), CoreError> {
    if principal.can(capability) {
        return Ok(());
    }
    tracing::debug!(
        account_id = principal.account_id,
        capability = %capability,
        "Capability check failed",
    );
    Err(CoreError::Authorization(format!(
        "missing capability '{capability}'"
    )))
}

/// Allow acting on `target_account_id` if it is the principal's own account,
/// otherwise require `capability`.
pub fn require_self_or(
    principal: &Principal,
    target_account_id: DbId,
    capability: Capability,
) -> Result<(), CoreError> {
    if principal.account_id == target_account_id {
        Ok(())
    } else {
        require(principal, capability)
    }
}

/// A member's role on a specific resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Employee,
    Manager,
    Owner,
}

impl MembershipRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Manager => "manager",
            MembershipRole::Employee => "employee",
        }
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MembershipRole::Owner),
            "manager" => Ok(MembershipRole::Manager),
            "employee" => Ok(MembershipRole::Employee),
            other => Err(CoreError::Validation(format!(
                "unknown membership role '{other}'"
            ))),
        }
    }
}

/// Membership check for resource-scoped operations.
///
/// Passes when the principal holds `capability` outright, or when its
/// membership on the resource is one of `allowed`.
pub fn require_membership(
    principal: &Principal,
    capability: Capability,
    membership: Option<MembershipRole>,
    allowed: &[MembershipRole],
) -> Result<(), CoreError> {
    if principal.can(capability) {
        return Ok(());
    }
    match membership {
        Some(role) if allowed.contains(&role) => Ok(()),
        Some(role) => Err(CoreError::Authorization(format!(
            "'{}' members cannot perform this operation",
            role.as_str()
        ))),
        None => Err(CoreError::Authorization(
            "not a member of this resource".into(),
        )),
    }
}
