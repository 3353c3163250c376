//! Access controller — explicit role membership checked by every
//! mutating entry point.
//!
//! Membership is a plain table of (role, account) pairs. Nothing is
//! implied: the foundation account is an admin only because bootstrap
//! granted it the role, and it stops being one the moment the role is
//! revoked or renounced.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::Account;

use super::role::Role;

/// Role-membership table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessController {
    members: BTreeMap<Role, BTreeSet<Account>>,
}

impl AccessController {
    /// An empty table. Nobody can mutate anything until a role is seeded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap membership: ADMIN + OPERATOR to `foundation`, OPERATOR to
    /// `network_operator`.
    pub fn bootstrap(foundation: &Account, network_operator: &Account) -> Self {
        let mut ac = Self::new();
        ac.insert(Role::Admin, foundation.clone());
        ac.insert(Role::Operator, foundation.clone());
        ac.insert(Role::Operator, network_operator.clone());
        ac
    }

    pub fn has_role(&self, role: Role, account: &Account) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(account))
    }

    /// Fail with `Unauthorized` unless `caller` holds `role`.
    pub fn require(&self, role: Role, caller: &Account) -> Result<()> {
        if self.has_role(role, caller) {
            return Ok(());
        }
        warn!("{caller} attempted an operation requiring {role}");
        Err(RegistryError::Unauthorized {
            role,
            caller: caller.clone(),
        })
    }

    /// Grant `role` to `account`. Only admins may grant.
    ///
    /// Returns `true` if membership changed.
    pub fn grant_role(&mut self, caller: &Account, role: Role, account: &Account) -> Result<bool> {
        self.require(Role::Admin, caller)?;
        let changed = self.insert(role, account.clone());
        if changed {
            info!("{caller} granted {role} to {account}");
        }
        Ok(changed)
    }

    /// Revoke `role` from `account`. Only admins may revoke.
    ///
    /// Returns `true` if membership changed.
    pub fn revoke_role(
        &mut self,
        caller: &Account,
        role: Role,
        account: &Account,
    ) -> Result<bool> {
        self.require(Role::Admin, caller)?;
        let changed = self.remove(role, account);
        if changed {
            info!("{caller} revoked {role} from {account}");
        }
        Ok(changed)
    }

    /// Drop one of the caller's own roles. Needs no role to call.
    ///
    /// Returns `true` if membership changed.
    pub fn renounce_role(&mut self, caller: &Account, role: Role) -> bool {
        let changed = self.remove(role, caller);
        if changed {
            info!("{caller} renounced {role}");
        }
        changed
    }

    /// Members of `role` in account order.
    pub fn members(&self, role: Role) -> Vec<Account> {
        self.members
            .get(&role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Roles held by `account`.
    pub fn roles_of(&self, account: &Account) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.has_role(*role, account))
            .collect()
    }

    fn insert(&mut self, role: Role, account: Account) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    fn remove(&mut self, role: Role, account: &Account) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|set| set.remove(account))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
