//! Consumer-side reads and eligibility checks.
//!
//! Downstream systems (token contracts, gated services) consume the
//! registry read-only. This module provides:
//!
//! - [`RegistryReader`] — the read surface, implemented by
//!   [`IdentityRegistry`] and [`SharedRegistry`]. On the shared handle each
//!   read locks separately; use [`SharedRegistry::evaluate`] to check a
//!   policy against a single committed state.
//! - [`EligibilityPolicy`] / [`Eligibility`] — a declarative check over
//!   credential, suspension and attribute requirements.
//!
//! ## Evaluation model
//!
//! The registry itself never decides eligibility: it returns values with
//! their expiry and leaves the comparison to the consumer. A policy
//! evaluation:
//! 1. Requires a credential and an unsuspended account.
//! 2. Reads every required attribute through its typed getter.
//! 3. Requires `expiry > now` and a matching value for each.
//!
//! Every failed condition is reported, not just the first.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeId, AttributeReading, AttributeType, Uint256};
use crate::error::Result;
use crate::identity::Account;
use crate::registry::{IdentityRegistry, SharedRegistry};

// ── RegistryReader ────────────────────────────────────────────────────────────

/// Read-only view of a registry.
pub trait RegistryReader {
    fn has_credential(&self, account: &Account) -> bool;
    fn is_suspended(&self, account: &Account) -> bool;
    fn attribute_count(&self) -> u64;
    fn attribute_name(&self, id: AttributeId) -> String;
    fn attribute_type(&self, id: AttributeId) -> Result<AttributeType>;
    fn get_bool_attribute(&self, account: &Account, id: AttributeId)
        -> Result<AttributeReading<bool>>;
    fn get_string_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<String>>;
    fn get_uint_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Uint256>>;
    fn get_bytes_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Vec<u8>>>;
}

impl RegistryReader for IdentityRegistry {
    fn has_credential(&self, account: &Account) -> bool {
        IdentityRegistry::has_credential(self, account)
    }

    fn is_suspended(&self, account: &Account) -> bool {
        IdentityRegistry::is_suspended(self, account)
    }

    fn attribute_count(&self) -> u64 {
        IdentityRegistry::attribute_count(self)
    }

    fn attribute_name(&self, id: AttributeId) -> String {
        IdentityRegistry::attribute_name(self, id)
    }

    fn attribute_type(&self, id: AttributeId) -> Result<AttributeType> {
        IdentityRegistry::attribute_type(self, id)
    }

    fn get_bool_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<bool>> {
        IdentityRegistry::get_bool_attribute(self, account, id)
    }

    fn get_string_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<String>> {
        IdentityRegistry::get_string_attribute(self, account, id)
    }

    fn get_uint_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Uint256>> {
        IdentityRegistry::get_uint_attribute(self, account, id)
    }

    fn get_bytes_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Vec<u8>>> {
        IdentityRegistry::get_bytes_attribute(self, account, id)
    }
}

impl RegistryReader for SharedRegistry {
    fn has_credential(&self, account: &Account) -> bool {
        self.read(|r| r.has_credential(account))
    }

    fn is_suspended(&self, account: &Account) -> bool {
        self.read(|r| r.is_suspended(account))
    }

    fn attribute_count(&self) -> u64 {
        self.read(|r| r.attribute_count())
    }

    fn attribute_name(&self, id: AttributeId) -> String {
        self.read(|r| r.attribute_name(id))
    }

    fn attribute_type(&self, id: AttributeId) -> Result<AttributeType> {
        self.read(|r| r.attribute_type(id))
    }

    fn get_bool_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<bool>> {
        self.read(|r| r.get_bool_attribute(account, id))
    }

    fn get_string_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<String>> {
        self.read(|r| r.get_string_attribute(account, id))
    }

    fn get_uint_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Uint256>> {
        self.read(|r| r.get_uint_attribute(account, id))
    }

    fn get_bytes_attribute(
        &self,
        account: &Account,
        id: AttributeId,
    ) -> Result<AttributeReading<Vec<u8>>> {
        self.read(|r| r.get_bytes_attribute(account, id))
    }
}

// ── Requirement ───────────────────────────────────────────────────────────────

/// One attribute condition. Every requirement also demands an unexpired
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    UintAtLeast { id: AttributeId, min: Uint256 },
    UintEquals { id: AttributeId, value: Uint256 },
    BoolIs { id: AttributeId, value: bool },
    StringIn { id: AttributeId, allowed: Vec<String> },
}

impl Requirement {
    pub fn id(&self) -> AttributeId {
        match self {
            Self::UintAtLeast { id, .. }
            | Self::UintEquals { id, .. }
            | Self::BoolIs { id, .. }
            | Self::StringIn { id, .. } => *id,
        }
    }

    fn check<R: RegistryReader + ?Sized>(
        &self,
        reader: &R,
        account: &Account,
        now: u64,
        reasons: &mut Vec<Ineligibility>,
    ) {
        let id = self.id();
        // (matched, expiry valid), or None when the getter refused.
        let outcome = match self {
            Self::UintAtLeast { min, .. } => reader
                .get_uint_attribute(account, id)
                .map(|r| (r.value >= *min, r.is_valid_at(now))),
            Self::UintEquals { value, .. } => reader
                .get_uint_attribute(account, id)
                .map(|r| (r.value == *value, r.is_valid_at(now))),
            Self::BoolIs { value, .. } => reader
                .get_bool_attribute(account, id)
                .map(|r| (r.value == *value, r.is_valid_at(now))),
            Self::StringIn { allowed, .. } => reader
                .get_string_attribute(account, id)
                .map(|r| (allowed.contains(&r.value), r.is_valid_at(now))),
        };
        match outcome {
            Ok((matched, valid)) => {
                if !valid {
                    reasons.push(Ineligibility::AttributeExpired(id));
                }
                if !matched {
                    reasons.push(Ineligibility::AttributeMismatch(id));
                }
            }
            Err(_) => reasons.push(Ineligibility::AttributeUnreadable(id)),
        }
    }
}

// ── Eligibility ───────────────────────────────────────────────────────────────

/// Why an account failed a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "id", rename_all = "snake_case")]
pub enum Ineligibility {
    NoCredential,
    Suspended,
    AttributeExpired(AttributeId),
    AttributeMismatch(AttributeId),
    /// Out of range, declared as a different type, or stranded by a retype.
    AttributeUnreadable(AttributeId),
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredential => write!(f, "no credential"),
            Self::Suspended => write!(f, "account suspended"),
            Self::AttributeExpired(id) => write!(f, "attribute {id} expired"),
            Self::AttributeMismatch(id) => write!(f, "attribute {id} does not match"),
            Self::AttributeUnreadable(id) => write!(f, "attribute {id} unreadable"),
        }
    }
}

/// Result of [`EligibilityPolicy::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reasons: Vec<Ineligibility>,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }
}

// ── EligibilityPolicy ─────────────────────────────────────────────────────────

/// Builder for an eligibility check.
///
/// ```
/// use identity_registry::attribute::{COUNTRY_CODE, USER_TYPE};
/// use identity_registry::query::EligibilityPolicy;
///
/// let policy = EligibilityPolicy::new()
///     .string_in(COUNTRY_CODE, ["sg"])
///     .uint_equals(USER_TYPE, 1u64);
/// assert_eq!(policy.requirements().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    requirements: Vec<Requirement>,
}

impl EligibilityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn uint_at_least(self, id: AttributeId, min: impl Into<Uint256>) -> Self {
        self.require(Requirement::UintAtLeast {
            id,
            min: min.into(),
        })
    }

    pub fn uint_equals(self, id: AttributeId, value: impl Into<Uint256>) -> Self {
        self.require(Requirement::UintEquals {
            id,
            value: value.into(),
        })
    }

    pub fn bool_is(self, id: AttributeId, value: bool) -> Self {
        self.require(Requirement::BoolIs { id, value })
    }

    pub fn string_in<S: Into<String>>(
        self,
        id: AttributeId,
        allowed: impl IntoIterator<Item = S>,
    ) -> Self {
        self.require(Requirement::StringIn {
            id,
            allowed: allowed.into_iter().map(Into::into).collect(),
        })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Evaluate the policy for `account` at time `now`.
    pub fn evaluate<R: RegistryReader + ?Sized>(
        &self,
        reader: &R,
        account: &Account,
        now: u64,
    ) -> Eligibility {
        let mut reasons = Vec::new();
        if !reader.has_credential(account) {
            reasons.push(Ineligibility::NoCredential);
        }
        if reader.is_suspended(account) {
            reasons.push(Ineligibility::Suspended);
        }
        for requirement in &self.requirements {
            requirement.check(reader, account, now, &mut reasons);
        }
        Eligibility {
            eligible: reasons.is_empty(),
            reasons,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
