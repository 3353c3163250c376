//! Storage layer for the registry state.
//!
//! The whole registry persists as one checksummed JSON file; there is no
//! per-record storage. By convention the CLI keeps it at
//! `~/.identity-registry/registry.json`.
//!
//! # Modules
//!
//! - [`state_file`] — atomic save/load of [`RegistryState`](crate::registry::RegistryState).
//! - [`migration`] — schema diffing and layout upgrades of loaded state.

pub mod migration;
pub mod state_file;

pub use migration::{check_additive, upgrade_state, SchemaDiff};
pub use state_file::{load_state, save_state, StateFile};
