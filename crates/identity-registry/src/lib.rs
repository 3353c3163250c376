//! IdentityRegistry — verifiable, expiring identity attributes for
//! permissioned token networks.
//!
//! Issues one non-transferable credential per account, stores typed
//! attribute values with expiries against it, and keeps account
//! suspension separate from credential data. Consumers read values and
//! decide eligibility themselves.

pub mod access;
pub mod attribute;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod query;
pub mod registry;
pub mod storage;
pub mod suspension;
pub mod time;

// Re-export primary types
pub use access::Role;
pub use attribute::{
    AttributeDefinition, AttributeId, AttributeReading, AttributeType, AttributeValue, Uint256,
};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use events::{EventValue, RegistryEvent};
pub use identity::{Account, CredentialId, IdentityRecord};
pub use registry::{IdentityRegistry, IssueRequest, RegistryState, SharedRegistry};

// Re-export consumer-side types
pub use query::{Eligibility, EligibilityPolicy, Ineligibility, RegistryReader, Requirement};

pub use time::{Clock, ManualClock, SystemClock};
