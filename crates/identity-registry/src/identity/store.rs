//! Identity store — credential records and per-account attribute values.
//!
//! Holds four logical tables:
//!
//! ```text
//! records     account       → IdentityRecord
//! owners      credential_id → account
//! values      account       → { attribute_id → (value, expiry, updated_at) }
//! token_uris  credential_id → uri
//! ```
//!
//! plus the credential counter. There is no operation that deletes a
//! record or moves one to a different account.
//!
//! The store enforces only its own invariants (one record per account,
//! writes require a record). Schema checks, expiry checks and
//! authorization belong to the registry facade.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeId, StoredAttribute};
use crate::error::{RegistryError, Result};

use super::record::{Account, CredentialId, IdentityRecord};

/// Credential and attribute-value tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityStore {
    records: BTreeMap<Account, IdentityRecord>,
    owners: BTreeMap<CredentialId, Account>,
    values: BTreeMap<Account, BTreeMap<AttributeId, StoredAttribute>>,
    token_uris: BTreeMap<CredentialId, String>,
    /// Last credential id handed out; 0 before the first issuance.
    counter: u64,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Credentials ───────────────────────────────────────────────────────────

    /// Create the record for `account` with the next credential id.
    ///
    /// # Errors
    ///
    /// `AlreadyVerified(account)` if the account already holds one.
    pub fn issue(&mut self, account: &Account, issued_at: u64) -> Result<IdentityRecord> {
        self.ensure_unissued(account)?;
        self.counter += 1;
        let record = IdentityRecord {
            account: account.clone(),
            credential_id: CredentialId(self.counter),
            issued_at,
        };
        self.owners.insert(record.credential_id, account.clone());
        self.records.insert(account.clone(), record.clone());
        Ok(record)
    }

    /// Fail with `AlreadyVerified` if `account` holds a credential.
    pub fn ensure_unissued(&self, account: &Account) -> Result<()> {
        if self.records.contains_key(account) {
            return Err(RegistryError::AlreadyVerified(account.clone()));
        }
        Ok(())
    }

    /// Fail with `NotVerified` unless `account` holds a credential.
    pub fn ensure_issued(&self, account: &Account) -> Result<&IdentityRecord> {
        self.records
            .get(account)
            .ok_or_else(|| RegistryError::NotVerified(account.clone()))
    }

    pub fn has_credential(&self, account: &Account) -> bool {
        self.records.contains_key(account)
    }

    pub fn record(&self, account: &Account) -> Option<&IdentityRecord> {
        self.records.get(account)
    }

    /// Owner of a credential.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId(id)` if the id was never issued.
    pub fn owner_of(&self, id: CredentialId) -> Result<&Account> {
        self.owners.get(&id).ok_or(RegistryError::InvalidTokenId(id))
    }

    /// Last credential id issued (0 if none).
    pub fn current_credential_id(&self) -> CredentialId {
        CredentialId(self.counter)
    }

    /// Number of credentials issued.
    pub fn credential_count(&self) -> usize {
        self.records.len()
    }

    // ── Token URIs ────────────────────────────────────────────────────────────

    /// Set the metadata URI of an issued credential.
    pub fn set_token_uri(&mut self, id: CredentialId, uri: impl Into<String>) -> Result<()> {
        self.owner_of(id)?;
        self.token_uris.insert(id, uri.into());
        Ok(())
    }

    /// Metadata URI of an issued credential; empty if never set.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId(id)` if the id was never issued.
    pub fn token_uri(&self, id: CredentialId) -> Result<String> {
        self.owner_of(id)?;
        Ok(self.token_uris.get(&id).cloned().unwrap_or_default())
    }

    // ── Attribute values ──────────────────────────────────────────────────────

    /// Replace the stored tuple for (account, id).
    ///
    /// # Errors
    ///
    /// `NotVerified(account)` if the account holds no credential.
    pub fn write(
        &mut self,
        account: &Account,
        id: AttributeId,
        stored: StoredAttribute,
    ) -> Result<()> {
        self.ensure_issued(account)?;
        self.values
            .entry(account.clone())
            .or_default()
            .insert(id, stored);
        Ok(())
    }

    /// The stored tuple for (account, id), if ever written.
    pub fn read(&self, account: &Account, id: AttributeId) -> Option<&StoredAttribute> {
        self.values.get(account).and_then(|m| m.get(&id))
    }

    /// Every stored value of an account in id order.
    pub fn values_of(
        &self,
        account: &Account,
    ) -> impl Iterator<Item = (&AttributeId, &StoredAttribute)> {
        self.values.get(account).into_iter().flat_map(|m| m.iter())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
