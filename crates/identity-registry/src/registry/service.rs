//! Identity registry facade — the public issue/set/get/suspend surface.
//!
//! `IdentityRegistry` composes the attribute schema, identity store,
//! suspension ledger and access controller. Every mutating entry point
//! follows the same shape:
//!
//! 1. check the caller's role;
//! 2. validate every input against the current state;
//! 3. commit and append notifications to the journal.
//!
//! Steps 1 and 2 never touch state, and step 3 cannot fail once step 2
//! has passed. A rejected call therefore leaves no trace: no state
//! change and no event.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::access::Role;
use crate::attribute::{
    AttributeDefinition, AttributeId, AttributeReading, AttributeType, AttributeValue,
    StoredAttribute, Uint256, COMPETENCY_RATING, COUNTRY_CODE, PRIMARY_ID, PROOF_OF_LIVELINESS,
    USER_TYPE,
};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::events::{EventValue, RegistryEvent};
use crate::identity::{Account, CredentialId, IdentityRecord};
use crate::suspension::SuspensionState;
use crate::time::Clock;

use super::state::RegistryState;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Arguments to [`IdentityRegistry::issue_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub primary_id: bool,
    pub country_code: String,
    pub proof_of_liveliness: bool,
    pub user_type: Uint256,
    /// Expiries for `primaryID`, `countryCode`, `proofOfLiveliness` and
    /// `userType`, in that order.
    pub expiries: [u64; 4],
    /// Metadata URI attached to the new credential.
    pub uri: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_expiry(expiry: u64, now: u64) -> Result<()> {
    if expiry <= now {
        return Err(RegistryError::InvalidExpiry(expiry));
    }
    Ok(())
}

/// Log a rejected mutation and pass the error through.
fn rejected(op: &'static str) -> impl Fn(RegistryError) -> RegistryError {
    move |e| {
        warn!("{op} rejected: {e}");
        e
    }
}

fn typed<T>(
    reading: AttributeReading<AttributeValue>,
    id: AttributeId,
    extract: impl FnOnce(&AttributeValue) -> Option<T>,
) -> Result<AttributeReading<T>> {
    let value = extract(&reading.value).ok_or(RegistryError::InvalidAttribute(id))?;
    Ok(reading.map(|_| value))
}

// ── IdentityRegistry ──────────────────────────────────────────────────────────

/// The verifiable-identity registry.
pub struct IdentityRegistry {
    state: RegistryState,
    clock: Arc<dyn Clock>,
    journal: Vec<RegistryEvent>,
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("state", &self.state)
            .field("journal_len", &self.journal.len())
            .finish()
    }
}

impl IdentityRegistry {
    /// Deploy a new registry from `config`.
    pub fn new(config: &RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            "bootstrapping registry: foundation={}, network_operator={}",
            config.foundation, config.network_operator
        );
        Self::from_state(RegistryState::bootstrap(config), clock)
    }

    /// Resume from previously persisted tables. The journal starts empty.
    pub fn from_state(state: RegistryState, clock: Arc<dyn Clock>) -> Self {
        Self {
            state,
            clock,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn into_state(self) -> RegistryState {
        self.state
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    // ── Notifications ─────────────────────────────────────────────────────────

    /// Events emitted since construction or the last drain.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.journal
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.journal)
    }

    // ── Attribute schema ──────────────────────────────────────────────────────

    /// Append a new attribute. Its id is the attribute count before the call.
    pub fn add_attribute(
        &mut self,
        caller: &Account,
        name: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Result<AttributeId> {
        self.state.access.require(Role::Operator, caller)?;
        let name = name.into();
        let id = self
            .state
            .attributes
            .add(name.clone(), attribute_type)
            .map_err(rejected("add_attribute"))?;
        info!("attribute {id} added: {name} ({attribute_type})");
        self.journal.push(RegistryEvent::AttributeAdded {
            id,
            name,
            attribute_type,
        });
        Ok(id)
    }

    /// Correct the name of an existing attribute.
    pub fn set_attribute_name(
        &mut self,
        caller: &Account,
        id: AttributeId,
        name: impl Into<String>,
    ) -> Result<()> {
        self.state.access.require(Role::Operator, caller)?;
        let name = name.into();
        self.state
            .attributes
            .rename(id, name.clone())
            .map_err(rejected("set_attribute_name"))?;
        info!("attribute {id} renamed to {name}");
        self.journal
            .push(RegistryEvent::AttributeRenamed { id, name });
        Ok(())
    }

    /// Correct the declared type of an existing attribute. Stored values
    /// are not migrated; a value written under the old type stops being
    /// readable through either typed getter until it is rewritten.
    pub fn set_attribute_type(
        &mut self,
        caller: &Account,
        id: AttributeId,
        attribute_type: AttributeType,
    ) -> Result<()> {
        self.state.access.require(Role::Admin, caller)?;
        self.state
            .attributes
            .retype(id, attribute_type)
            .map_err(rejected("set_attribute_type"))?;
        info!("attribute {id} retyped to {attribute_type}");
        self.journal.push(RegistryEvent::AttributeRetyped { id, attribute_type });
        Ok(())
    }

    /// Force the attribute count to `count`.
    ///
    /// This is an unguarded override. Raising the count exposes ids with
    /// no definition; lowering it hides attributes (and their values) from
    /// every getter and setter.
    pub fn set_attribute_count(&mut self, caller: &Account, count: u64) -> Result<()> {
        self.state.access.require(Role::Admin, caller)?;
        let previous = self.state.attributes.set_count(count);
        warn!("attribute count forced from {previous} to {count} by {caller}");
        self.journal
            .push(RegistryEvent::AttributeCountSet { previous, count });
        Ok(())
    }

    /// Name of `id`; empty for an unknown id.
    pub fn attribute_name(&self, id: AttributeId) -> String {
        self.state.attributes.name(id)
    }

    /// Declared type of `id`; `InvalidAttribute` if `id >= attribute_count()`.
    pub fn attribute_type(&self, id: AttributeId) -> Result<AttributeType> {
        self.state.attributes.attribute_type(id)
    }

    pub fn attribute_count(&self) -> u64 {
        self.state.attributes.count()
    }

    /// Visible schema rows in id order.
    pub fn attribute_definitions(&self) -> Vec<AttributeDefinition> {
        self.state.attributes.definitions().cloned().collect()
    }

    // ── Issuance ──────────────────────────────────────────────────────────────

    /// Issue the one credential `account` will ever hold and write its
    /// four core attributes (ids 0–3) stamped with the issuance time.
    pub fn issue_identity(
        &mut self,
        caller: &Account,
        account: &Account,
        request: IssueRequest,
    ) -> Result<CredentialId> {
        self.state.access.require(Role::Operator, caller)?;
        let now = self.now();
        self.state
            .identities
            .ensure_unissued(account)
            .map_err(rejected("issue_identity"))?;
        for expiry in request.expiries {
            check_expiry(expiry, now).map_err(rejected("issue_identity"))?;
        }

        let record = self.state.identities.issue(account, now)?;
        let mut events = vec![RegistryEvent::IdentityIssued {
            account: account.clone(),
            credential_id: record.credential_id,
            issued_at: now,
        }];
        let core = [
            (PRIMARY_ID, AttributeValue::Bool(request.primary_id)),
            (COUNTRY_CODE, AttributeValue::Str(request.country_code)),
            (PROOF_OF_LIVELINESS, AttributeValue::Bool(request.proof_of_liveliness)),
            (USER_TYPE, AttributeValue::UInt(request.user_type)),
        ];
        for ((id, value), expiry) in core.into_iter().zip(request.expiries) {
            events.push(self.commit_write(account, id, value, expiry, now)?);
        }
        self.state
            .identities
            .set_token_uri(record.credential_id, request.uri)?;

        info!(
            "issued credential {} to {account}",
            record.credential_id
        );
        self.journal.extend(events);
        Ok(record.credential_id)
    }

    // ── Attribute writes ──────────────────────────────────────────────────────

    /// Write any attribute. The value's variant must match the declared
    /// type of `id`.
    ///
    /// Checks, in order: `id < attribute_count()` and declared type
    /// (`InvalidAttribute`), credential present (`NotVerified`),
    /// `expiry > now` (`InvalidExpiry`).
    pub fn set_attribute(
        &mut self,
        caller: &Account,
        account: &Account,
        id: AttributeId,
        value: AttributeValue,
        expiry: u64,
    ) -> Result<()> {
        self.state.access.require(Role::Operator, caller)?;
        let now = self.now();
        self.validate_write(account, id, value.attribute_type(), expiry, now)
            .map_err(rejected("set_attribute"))?;
        let event = self.commit_write(account, id, value, expiry, now)?;
        self.journal.push(event);
        Ok(())
    }

    pub fn set_bool_attribute(
        &mut self,
        caller: &Account,
        account: &Account,
        id: AttributeId,
        value: bool,
        expiry: u64,
    ) -> Result<()> {
        self.set_attribute(caller, account, id, AttributeValue::Bool(value), expiry)
    }

    pub fn set_string_attribute(
        &mut self,
        caller: &Account,
        account: &Account,
        id: AttributeId,
        value: impl Into<String>,
        expiry: u64,
    ) -> Result<()> {
        self.set_attribute(caller, account, id, AttributeValue::Str(value.into()), expiry)
    }

    pub fn set_uint_attribute(
        &mut self,
        caller: &Account,
        account: &Account,
        id: AttributeId,
        value: impl Into<Uint256>,
        expiry: u64,
    ) -> Result<()> {
        self.set_attribute(caller, account, id, AttributeValue::UInt(value.into()), expiry)
    }

    pub fn set_bytes_attribute(
        &mut self,
        caller: &Account,
        account: &Account,
        id: AttributeId,
        value: impl Into<Vec<u8>>,
        expiry: u64,
    ) -> Result<()> {
        self.set_attribute(caller, account, id, AttributeValue::Bytes(value.into()), expiry)
    }

    fn validate_write(
        &self,
        account: &Account,
        id: AttributeId,
        attribute_type: AttributeType,
        expiry: u64,
        now: u64,
    ) -> Result<()> {
        self.state.attributes.expect_type(id, attribute_type)?;
        self.state.identities.ensure_issued(account)?;
        check_expiry(expiry, now)
    }

    fn commit_write(
        &mut self,
        account: &Account,
        id: AttributeId,
        value: AttributeValue,
        expiry: u64,
        now: u64,
    ) -> Result<RegistryEvent> {
        let event_value = EventValue::from(&value);
        match &value {
            AttributeValue::Bytes(b) => {
                debug!("{account} attribute {id} <- {} bytes", b.len())
            }
            other => debug!("{account} attribute {id} <- {other:?}"),
        }
        self.state.identities.write(
            account,
            id,
            StoredAttribute {
                value,
                expiry,
                updated_at: now,
            },
        )?;
        Ok(RegistryEvent::AttributeSet {
            account: account.clone(),
            id,
            value: event_value,
            expiry,
            updated_at: now,
        })
    }

    // ── Attribute reads ───────────────────────────────────────────────────────

    /// Read an attribute through the accessor for `expected`.
    ///
    /// A pair that was never written reads as the zero value with
    /// `expiry == 0` and `updated_at == 0`. Fails with `InvalidAttribute`
    /// if `id` is out of range, declared as another type, or holds a value
    /// of another type.
    pub fn get_attribute(
        &self,
        account: &Account,
        id: AttributeId,
        expected: AttributeType,
    ) -> Result<AttributeReading<AttributeValue>> {
        self.state.attributes.expect_type(id, expected)?;
        match self.state.identities.read(account, id) {
            None => Ok(AttributeReading {
                value: AttributeValue::zero(expected),
                expiry: 0,
                updated_at: 0,
            }),
            Some(stored) if stored.value.attribute_type() == expected => {
                Ok(stored.clone().into())
            }
            Some(_) => Err(RegistryError::InvalidAttribute(id)),
        }
    }

    pub fn get_bool_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<bool>> {
        let reading = self.get_attribute(account, id, AttributeType::Bool)?;
        typed(reading, id, AttributeValue::as_bool)
    }

    pub fn get_string_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<String>> {
        let reading = self.get_attribute(account, id, AttributeType::String)?;
        typed(reading, id, |v| v.as_str().map(str::to_owned))
    }

    pub fn get_uint_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Uint256>> {
        let reading = self.get_attribute(account, id, AttributeType::UInt)?;
        typed(reading, id, AttributeValue::as_uint)
    }

    pub fn get_bytes_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Vec<u8>>> {
        let reading = self.get_attribute(account, id, AttributeType::Bytes)?;
        typed(reading, id, |v| v.as_bytes().map(<[u8]>::to_vec))
    }

    pub fn primary_id(&self, account: &Account) -> Result<AttributeReading<bool>> {
        self.get_bool_attribute(account, PRIMARY_ID)
    }

    pub fn country_code(&self, account: &Account) -> Result<AttributeReading<String>> {
        self.get_string_attribute(account, COUNTRY_CODE)
    }

    pub fn proof_of_liveliness(&self, account: &Account) -> Result<AttributeReading<bool>> {
        self.get_bool_attribute(account, PROOF_OF_LIVELINESS)
    }

    pub fn user_type(&self, account: &Account) -> Result<AttributeReading<Uint256>> {
        self.get_uint_attribute(account, USER_TYPE)
    }

    pub fn competency_rating(&self, account: &Account) -> Result<AttributeReading<Uint256>> {
        self.get_uint_attribute(account, COMPETENCY_RATING)
    }

    // ── Credentials ───────────────────────────────────────────────────────────

    pub fn has_credential(&self, account: &Account) -> bool {
        self.state.identities.has_credential(account)
    }

    pub fn credential_of(&self, account: &Account) -> Option<IdentityRecord> {
        self.state.identities.record(account).cloned()
    }

    /// `InvalidTokenId` for an id that was never issued.
    pub fn owner_of(&self, credential_id: CredentialId) -> Result<Account> {
        self.state.identities.owner_of(credential_id).cloned()
    }

    /// 1 if `account` holds a credential, else 0.
    pub fn balance_of(&self, account: &Account) -> u64 {
        u64::from(self.has_credential(account))
    }

    /// Last credential id issued; 0 before the first issuance.
    pub fn current_credential_id(&self) -> CredentialId {
        self.state.identities.current_credential_id()
    }

    /// Credentials cannot move between accounts. Always fails with
    /// `NotTransferable`, whoever calls and whatever the arguments.
    pub fn transfer_credential(
        &self,
        caller: &Account,
        from: &Account,
        to: &Account,
        credential_id: CredentialId,
    ) -> Result<()> {
        warn!("{caller} attempted to transfer credential {credential_id} from {from} to {to}");
        Err(RegistryError::NotTransferable(credential_id))
    }

    /// Replace the metadata URI of `account`'s credential.
    pub fn set_token_uri(
        &mut self,
        caller: &Account,
        account: &Account,
        credential_id: CredentialId,
        uri: impl Into<String>,
    ) -> Result<()> {
        self.state.access.require(Role::Operator, caller)?;
        let owner = self
            .state
            .identities
            .owner_of(credential_id)
            .map_err(rejected("set_token_uri"))?;
        if owner != account {
            return Err(rejected("set_token_uri")(RegistryError::NotVerified(
                account.clone(),
            )));
        }
        let uri = uri.into();
        self.state.identities.set_token_uri(credential_id, uri.clone())?;
        info!("token uri of credential {credential_id} updated");
        self.journal
            .push(RegistryEvent::TokenUriUpdated { credential_id, uri });
        Ok(())
    }

    /// Metadata URI of an issued credential; `InvalidTokenId` otherwise.
    pub fn token_uri(&self, credential_id: CredentialId) -> Result<String> {
        self.state.identities.token_uri(credential_id)
    }

    // ── Suspension ────────────────────────────────────────────────────────────

    /// Suspend `account`. Re-suspending replaces the reason.
    pub fn suspend_account(
        &mut self,
        caller: &Account,
        account: &Account,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.state.access.require(Role::Operator, caller)?;
        let reason = reason.into();
        self.state.suspensions.suspend(account, reason.clone());
        info!("{account} suspended: {reason}");
        self.journal.push(RegistryEvent::AccountSuspended {
            account: account.clone(),
            reason,
        });
        Ok(())
    }

    /// Lift a suspension. Emits its notification even when `account` was
    /// not suspended.
    pub fn unsuspend_account(&mut self, caller: &Account, account: &Account) -> Result<()> {
        self.state.access.require(Role::Operator, caller)?;
        self.state.suspensions.unsuspend(account);
        info!("{account} unsuspended");
        self.journal.push(RegistryEvent::AccountUnsuspended {
            account: account.clone(),
        });
        Ok(())
    }

    pub fn is_suspended(&self, account: &Account) -> bool {
        self.state.suspensions.is_suspended(account)
    }

    pub fn suspension(&self, account: &Account) -> SuspensionState {
        self.state.suspensions.state(account)
    }

    // ── Roles ─────────────────────────────────────────────────────────────────

    pub fn has_role(&self, role: Role, account: &Account) -> bool {
        self.state.access.has_role(role, account)
    }

    pub fn role_members(&self, role: Role) -> Vec<Account> {
        self.state.access.members(role)
    }

    pub fn roles_of(&self, account: &Account) -> Vec<Role> {
        self.state.access.roles_of(account)
    }

    /// ADMIN only. Granting a held role changes nothing and emits nothing.
    pub fn grant_role(&mut self, caller: &Account, role: Role, account: &Account) -> Result<()> {
        if self.state.access.grant_role(caller, role, account)? {
            self.journal.push(RegistryEvent::RoleGranted {
                role,
                account: account.clone(),
                sender: caller.clone(),
            });
        }
        Ok(())
    }

    /// ADMIN only. Revoking an absent role changes nothing and emits nothing.
    pub fn revoke_role(&mut self, caller: &Account, role: Role, account: &Account) -> Result<()> {
        if self.state.access.revoke_role(caller, role, account)? {
            self.journal.push(RegistryEvent::RoleRevoked {
                role,
                account: account.clone(),
                sender: caller.clone(),
            });
        }
        Ok(())
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(&mut self, caller: &Account, role: Role) {
        if self.state.access.renounce_role(caller, role) {
            self.journal.push(RegistryEvent::RoleRevoked {
                role,
                account: caller.clone(),
                sender: caller.clone(),
            });
        }
    }

    // ── Versioning ────────────────────────────────────────────────────────────

    /// Approve running a newer storage layout against this state.
    ///
    /// `to_layout` must be newer than the current layout.
    pub fn authorize_migration(&mut self, caller: &Account, to_layout: u32) -> Result<()> {
        self.state.access.require(Role::Admin, caller)?;
        let from_layout = self.state.layout_version;
        if to_layout <= from_layout {
            return Err(rejected("authorize_migration")(
                RegistryError::UnsupportedLayout {
                    found: to_layout,
                    supported: from_layout,
                },
            ));
        }
        self.state.authorized_layout = Some(to_layout);
        info!("{caller} authorized migration from layout {from_layout} to {to_layout}");
        self.journal.push(RegistryEvent::MigrationAuthorized {
            from_layout,
            to_layout,
            sender: caller.clone(),
        });
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
