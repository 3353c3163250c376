//! Identity records — one non-transferable credential per account and
//! the attribute values written against it.

pub mod record;
pub mod store;

pub use record::{Account, CredentialId, IdentityRecord};
pub use store::IdentityStore;
