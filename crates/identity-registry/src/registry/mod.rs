//! The registry — schema, credentials, values, suspensions and roles
//! behind one facade.
//!
//! - [`state`] — the persisted tables and their layout version.
//! - [`service`] — [`IdentityRegistry`], the validate-then-commit facade.
//! - [`shared`] — [`SharedRegistry`], a lock-guarded handle for threads.

pub mod service;
pub mod shared;
pub mod state;

pub use service::{IdentityRegistry, IssueRequest};
pub use shared::SharedRegistry;
pub use state::{RegistryState, LAYOUT_VERSION};
