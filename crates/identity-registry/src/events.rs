//! Registry notifications.
//!
//! Every committed mutation appends one or more [`RegistryEvent`]s to the
//! registry journal. A rejected operation appends nothing.
//!
//! Bytes payloads are summarised by length and SHA-256 digest; the raw
//! blob never appears in an event.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::access::Role;
use crate::attribute::{AttributeId, AttributeType, AttributeValue, Uint256};
use crate::identity::{Account, CredentialId};

/// The identifying fields of a written value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventValue {
    Bool { value: bool },
    String { value: String },
    Uint { value: Uint256 },
    Bytes { len: usize, sha256: String },
}

impl From<&AttributeValue> for EventValue {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Bool(b) => Self::Bool { value: *b },
            AttributeValue::Str(s) => Self::String { value: s.clone() },
            AttributeValue::UInt(v) => Self::Uint { value: *v },
            AttributeValue::Bytes(b) => Self::Bytes {
                len: b.len(),
                sha256: hex::encode(Sha256::digest(b)),
            },
        }
    }
}

/// A notification emitted by a committed registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    IdentityIssued {
        account: Account,
        credential_id: CredentialId,
        issued_at: u64,
    },
    AttributeAdded {
        id: AttributeId,
        name: String,
        attribute_type: AttributeType,
    },
    AttributeRenamed {
        id: AttributeId,
        name: String,
    },
    AttributeRetyped {
        id: AttributeId,
        attribute_type: AttributeType,
    },
    AttributeCountSet {
        previous: u64,
        count: u64,
    },
    AttributeSet {
        account: Account,
        id: AttributeId,
        value: EventValue,
        expiry: u64,
        updated_at: u64,
    },
    TokenUriUpdated {
        credential_id: CredentialId,
        uri: String,
    },
    AccountSuspended {
        account: Account,
        reason: String,
    },
    AccountUnsuspended {
        account: Account,
    },
    RoleGranted {
        role: Role,
        account: Account,
        sender: Account,
    },
    RoleRevoked {
        role: Role,
        account: Account,
        sender: Account,
    },
    MigrationAuthorized {
        from_layout: u32,
        to_layout: u32,
        sender: Account,
    },
}

impl RegistryEvent {
    /// Short stable name, matching the serialized `event` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IdentityIssued { .. } => "identity_issued",
            Self::AttributeAdded { .. } => "attribute_added",
            Self::AttributeRenamed { .. } => "attribute_renamed",
            Self::AttributeRetyped { .. } => "attribute_retyped",
            Self::AttributeCountSet { .. } => "attribute_count_set",
            Self::AttributeSet { .. } => "attribute_set",
            Self::TokenUriUpdated { .. } => "token_uri_updated",
            Self::AccountSuspended { .. } => "account_suspended",
            Self::AccountUnsuspended { .. } => "account_unsuspended",
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
            Self::MigrationAuthorized { .. } => "migration_authorized",
        }
    }

    /// The account the event is about, if it concerns one.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::IdentityIssued { account, .. }
            | Self::AttributeSet { account, .. }
            | Self::AccountSuspended { account, .. }
            | Self::AccountUnsuspended { account }
            | Self::RoleGranted { account, .. }
            | Self::RoleRevoked { account, .. } => Some(account),
            _ => None,
        }
    }
}
