//! The registry's persisted tables.
//!
//! `RegistryState` is the whole logical store: attribute definitions,
//! attribute values, identity records, suspension flags and role
//! membership. Its shape only grows. A newer layout may add tables or
//! append attribute ids but never renumbers or removes existing ones, so
//! upgrading is running newer code against the same state.

use serde::{Deserialize, Serialize};

use crate::access::AccessController;
use crate::attribute::AttributeRegistry;
use crate::config::RegistryConfig;
use crate::identity::IdentityStore;
use crate::suspension::SuspensionLedger;

/// Layout version written by this build.
pub const LAYOUT_VERSION: u32 = 1;

/// All registry tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub layout_version: u32,
    pub attributes: AttributeRegistry,
    pub identities: IdentityStore,
    pub suspensions: SuspensionLedger,
    pub access: AccessController,
    /// Target layout an admin has approved a migration to, if any.
    #[serde(default)]
    pub authorized_layout: Option<u32>,
}

impl RegistryState {
    /// Fresh state seeded from `config`.
    pub fn bootstrap(config: &RegistryConfig) -> Self {
        let attributes = if config.bootstrap_attributes {
            AttributeRegistry::with_bootstrap()
        } else {
            AttributeRegistry::new()
        };
        Self {
            layout_version: LAYOUT_VERSION,
            attributes,
            identities: IdentityStore::new(),
            suspensions: SuspensionLedger::new(),
            access: AccessController::bootstrap(&config.foundation, &config.network_operator),
            authorized_layout: None,
        }
    }
}
