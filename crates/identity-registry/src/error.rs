//! Error types for the identity registry.
//!
//! Every failure aborts the triggering operation before any state is
//! touched, so an `Err` always means "nothing happened". Variants carry the
//! offending values so callers can decide whether to retry with corrected
//! input.

use crate::access::Role;
use crate::attribute::AttributeId;
use crate::identity::{Account, CredentialId};

/// Registry error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Account {caller} is missing role {role}")]
    Unauthorized { role: Role, caller: Account },

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(AttributeId),

    #[error("Invalid expiry: {0} is not in the future")]
    InvalidExpiry(u64),

    #[error("Account already holds a credential: {0}")]
    AlreadyVerified(Account),

    #[error("Account holds no credential: {0}")]
    NotVerified(Account),

    #[error("Credential {0} is not transferable")]
    NotTransferable(CredentialId),

    #[error("Unknown credential id: {0}")]
    InvalidTokenId(CredentialId),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("State checksum mismatch: expected {expected}, actual {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported storage layout {found} (supported up to {supported})")]
    UnsupportedLayout { found: u32, supported: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Return `true` for the domain errors a caller can fix by changing
    /// its input, as opposed to storage failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidAttribute(_)
                | Self::InvalidExpiry(_)
                | Self::AlreadyVerified(_)
                | Self::NotVerified(_)
                | Self::NotTransferable(_)
                | Self::InvalidTokenId(_)
        )
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
