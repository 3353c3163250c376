//! Roles recognised by the access controller.

use serde::{Deserialize, Serialize};

/// A role gating a set of mutating entry points.
///
/// - `Admin`: role administration, schema type/count corrections and
///   migration authorization.
/// - `Operator`: issuance, attribute writes, suspension, token URIs and
///   schema additions/renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Operator,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Operator];

    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Operator => "OPERATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "operator" => Ok(Self::Operator),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
