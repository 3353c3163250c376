//! Data structures for typed, expiring attributes.

use serde::{Deserialize, Serialize};

use super::uint::Uint256;

// ── Attribute id ──────────────────────────────────────────────────────────────

/// Position of an attribute in the registry schema.
///
/// Ids are assigned sequentially and never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub u64);

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AttributeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

// ── Attribute type ────────────────────────────────────────────────────────────

/// Declared type of an attribute.
///
/// `Bool` is the default so that a schema slot with no definition (see
/// `AttributeRegistry::set_count`) reports the same type a fresh slot would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[default]
    Bool,
    String,
    UInt,
    Bytes,
}

impl AttributeType {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::UInt => "uint",
            Self::Bytes => "bytes",
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "string" | "str" => Ok(Self::String),
            "uint" | "u256" | "uint256" => Ok(Self::UInt),
            "bytes" => Ok(Self::Bytes),
            other => Err(format!("unknown attribute type: {other}")),
        }
    }
}

// ── Attribute definition ──────────────────────────────────────────────────────

/// One row of the attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: AttributeId,
    pub name: String,
    pub attribute_type: AttributeType,
}

// ── Attribute value ───────────────────────────────────────────────────────────

/// A tagged attribute value. The tag is the only source of truth for how
/// the payload is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    Bool(bool),
    #[serde(rename = "string")]
    Str(String),
    UInt(Uint256),
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
}

impl AttributeValue {
    /// The declared type this value satisfies.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Bool(_) => AttributeType::Bool,
            Self::Str(_) => AttributeType::String,
            Self::UInt(_) => AttributeType::UInt,
            Self::Bytes(_) => AttributeType::Bytes,
        }
    }

    /// The value an unset attribute of type `ty` reads as.
    pub fn zero(ty: AttributeType) -> Self {
        match ty {
            AttributeType::Bool => Self::Bool(false),
            AttributeType::String => Self::Str(String::new()),
            AttributeType::UInt => Self::UInt(Uint256::ZERO),
            AttributeType::Bytes => Self::Bytes(Vec::new()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<Uint256> {
        match self {
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Uint256> for AttributeValue {
    fn from(v: Uint256) -> Self {
        Self::UInt(v)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

// ── Stored attribute ──────────────────────────────────────────────────────────

/// The single most recent write for one (account, attribute) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttribute {
    pub value: AttributeValue,
    /// Unix seconds after which readers must treat the value as invalid.
    pub expiry: u64,
    /// Unix seconds of the write.
    pub updated_at: u64,
}

// ── Attribute reading ─────────────────────────────────────────────────────────

/// What a typed getter returns: `(value, expiry, updated_at)`.
///
/// An attribute that was never written reads as the type's zero value
/// with `expiry == 0` and `updated_at == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeReading<T> {
    pub value: T,
    pub expiry: u64,
    pub updated_at: u64,
}

impl<T> AttributeReading<T> {
    /// `true` if the value has been written and has not expired at `now`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.expiry > now
    }

    /// `true` if this reading came from an actual write.
    pub fn is_set(&self) -> bool {
        self.updated_at != 0
    }

    /// Replace the payload, keeping the timestamps.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AttributeReading<U> {
        AttributeReading {
            value: f(self.value),
            expiry: self.expiry,
            updated_at: self.updated_at,
        }
    }
}

impl From<StoredAttribute> for AttributeReading<AttributeValue> {
    fn from(stored: StoredAttribute) -> Self {
        Self {
            value: stored.value,
            expiry: stored.expiry,
            updated_at: stored.updated_at,
        }
    }
}

// ── Serde helper: bytes as hex ────────────────────────────────────────────────

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
