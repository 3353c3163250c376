//! Attributes — typed, expiring facts about an account.
//!
//! The attribute module provides:
//! - The append-only attribute schema (id → name, declared type)
//! - A tagged value type covering bool, string, 256-bit uint and bytes
//! - The stored `(value, expiry, updated_at)` tuple and its typed reading
//! - The five bootstrap attribute ids

pub mod registry;
pub mod types;
pub mod uint;

pub use registry::{
    AttributeRegistry, BOOTSTRAP_ATTRIBUTES, COMPETENCY_RATING, COUNTRY_CODE, PRIMARY_ID,
    PROOF_OF_LIVELINESS, USER_TYPE,
};
pub use types::{
    AttributeDefinition, AttributeId, AttributeReading, AttributeType, AttributeValue,
    StoredAttribute,
};
pub use uint::{ParseUint256Error, Uint256};
