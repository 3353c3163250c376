//! Thread-safe handle over one registry.
//!
//! Mutations take the write lock for their whole validate-then-commit
//! pass, so concurrent writers are serialized and readers never observe a
//! half-applied operation.

use std::sync::{Arc, PoisonError, RwLock};

use crate::identity::Account;
use crate::query::{Eligibility, EligibilityPolicy};
use crate::time::Clock;

use super::service::IdentityRegistry;
use super::state::RegistryState;

/// Cloneable `Arc<RwLock<IdentityRegistry>>`.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<IdentityRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: IdentityRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn from_state(state: RegistryState, clock: Arc<dyn Clock>) -> Self {
        Self::new(IdentityRegistry::from_state(state, clock))
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&IdentityRegistry) -> R) -> R {
        // Registry operations check before they write and return errors
        // instead of panicking, so a poison left by caller code in `f`
        // still guards committed state.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut IdentityRegistry) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Evaluate `policy` against one committed state.
    ///
    /// Going through [`RegistryReader`](crate::query::RegistryReader) on the
    /// handle takes the lock once per read, so a write may land between
    /// the suspension check and the attribute reads. This holds the read
    /// lock for the whole evaluation.
    pub fn evaluate(
        &self,
        policy: &EligibilityPolicy,
        account: &Account,
        now: u64,
    ) -> Eligibility {
        self.read(|r| policy.evaluate(r, account, now))
    }

    /// Copy of the current tables, e.g. for persisting.
    pub fn snapshot(&self) -> RegistryState {
        self.read(|r| r.state().clone())
    }
}
