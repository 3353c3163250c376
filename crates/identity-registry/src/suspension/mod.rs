//! Suspension ledger — a per-account flag and free-text reason, kept
//! apart from credential and attribute data.
//!
//! Suspension never touches the credential or its values. Consumers must
//! treat a suspended account as ineligible regardless of attribute state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::Account;

/// Suspension state of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionState {
    pub suspended: bool,
    pub reason: String,
}

/// Suspension table keyed by account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionLedger {
    entries: BTreeMap<Account, SuspensionState>,
}

impl SuspensionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `account` suspended. Re-suspending overwrites the reason.
    pub fn suspend(&mut self, account: &Account, reason: impl Into<String>) {
        self.entries.insert(
            account.clone(),
            SuspensionState {
                suspended: true,
                reason: reason.into(),
            },
        );
    }

    /// Clear the flag and the reason. A no-op for an account that is not
    /// suspended.
    pub fn unsuspend(&mut self, account: &Account) {
        self.entries.remove(account);
    }

    pub fn is_suspended(&self, account: &Account) -> bool {
        self.entries.get(account).is_some_and(|s| s.suspended)
    }

    /// Reason given for the current suspension, if any.
    pub fn reason(&self, account: &Account) -> Option<&str> {
        self.entries
            .get(account)
            .filter(|s| s.suspended)
            .map(|s| s.reason.as_str())
    }

    /// State of `account`; the default (not suspended) if never touched.
    pub fn state(&self, account: &Account) -> SuspensionState {
        self.entries.get(account).cloned().unwrap_or_default()
    }

    /// Suspended accounts in account order.
    pub fn suspended_accounts(&self) -> Vec<Account> {
        self.entries
            .iter()
            .filter(|(_, s)| s.suspended)
            .map(|(a, _)| a.clone())
            .collect()
    }
}
