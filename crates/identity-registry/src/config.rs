//! Deployment configuration.
//!
//! Names the two bootstrap accounts and whether the five standard
//! attributes are created at deployment. Stored as JSON:
//!
//! ```json
//! {
//!     "foundation": "0xf0...",
//!     "network_operator": "0x0e...",
//!     "bootstrap_attributes": true
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::Account;

fn default_true() -> bool {
    true
}

/// Bootstrap parameters for a new registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Receives ADMIN and OPERATOR.
    pub foundation: Account,
    /// Receives OPERATOR.
    pub network_operator: Account,
    /// Create `primaryID`, `countryCode`, `proofOfLiveliness`, `userType`
    /// and `competencyRating` at ids 0–4.
    #[serde(default = "default_true")]
    pub bootstrap_attributes: bool,
}

impl RegistryConfig {
    pub fn new(foundation: impl Into<Account>, network_operator: impl Into<Account>) -> Self {
        Self {
            foundation: foundation.into(),
            network_operator: network_operator.into(),
            bootstrap_attributes: true,
        }
    }

    /// Skip the bootstrap attributes.
    pub fn without_bootstrap_attributes(mut self) -> Self {
        self.bootstrap_attributes = false;
        self
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidFileFormat` if it does not
    /// parse.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RegistryError::InvalidFileFormat(format!(
                "failed to parse config {}: {e}",
                path.display()
            ))
        })
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json.as_bytes())?;
        Ok(())
    }
}
