//! Attribute registry — the append-only schema of attribute definitions.
//!
//! The registry owns two things: the definition table (id → name, type)
//! and the attribute count, which bounds every valid id. New attributes
//! take the current count as their id. Names and types may be corrected
//! in place; stored values are never migrated when a type changes.
//!
//! Authorization is not checked here. The registry facade gates every
//! mutating call before it reaches this table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

use super::types::{AttributeDefinition, AttributeId, AttributeType};

// ── Bootstrap schema ──────────────────────────────────────────────────────────

pub const PRIMARY_ID: AttributeId = AttributeId(0);
pub const COUNTRY_CODE: AttributeId = AttributeId(1);
pub const PROOF_OF_LIVELINESS: AttributeId = AttributeId(2);
pub const USER_TYPE: AttributeId = AttributeId(3);
pub const COMPETENCY_RATING: AttributeId = AttributeId(4);

/// The five attributes every deployment starts with, in id order.
pub const BOOTSTRAP_ATTRIBUTES: [(&str, AttributeType); 5] = [
    ("primaryID", AttributeType::Bool),
    ("countryCode", AttributeType::String),
    ("proofOfLiveliness", AttributeType::Bool),
    ("userType", AttributeType::UInt),
    ("competencyRating", AttributeType::UInt),
];

// ── AttributeRegistry ─────────────────────────────────────────────────────────

/// Schema table plus the attribute count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRegistry {
    definitions: BTreeMap<AttributeId, AttributeDefinition>,
    count: u64,
}

impl AttributeRegistry {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema holding the five bootstrap attributes at ids 0–4.
    pub fn with_bootstrap() -> Self {
        let definitions = BOOTSTRAP_ATTRIBUTES
            .iter()
            .zip(0u64..)
            .map(|(&(name, attribute_type), i)| {
                let id = AttributeId(i);
                let definition = AttributeDefinition {
                    id,
                    name: name.to_string(),
                    attribute_type,
                };
                (id, definition)
            })
            .collect();
        Self {
            definitions,
            count: BOOTSTRAP_ATTRIBUTES.len() as u64,
        }
    }

    /// Append a definition. The new id is the count before the call.
    ///
    /// If the count was previously lowered by [`set_count`](Self::set_count),
    /// the stale definition at that id is replaced.
    ///
    /// # Errors
    ///
    /// `InvalidAttribute(id)` if the count was forced to `u64::MAX` and no
    /// further id exists. Nothing is written in that case.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Result<AttributeId> {
        let id = AttributeId(self.count);
        let next = self
            .count
            .checked_add(1)
            .ok_or(RegistryError::InvalidAttribute(id))?;
        self.definitions.insert(
            id,
            AttributeDefinition {
                id,
                name: name.into(),
                attribute_type,
            },
        );
        self.count = next;
        Ok(id)
    }

    /// Correct the name of an existing id.
    pub fn rename(&mut self, id: AttributeId, name: impl Into<String>) -> Result<()> {
        self.check_id(id)?;
        self.slot(id).name = name.into();
        Ok(())
    }

    /// Correct the declared type of an existing id. Values already stored
    /// under the old type are left as they are.
    pub fn retype(&mut self, id: AttributeId, attribute_type: AttributeType) -> Result<()> {
        self.check_id(id)?;
        self.slot(id).attribute_type = attribute_type;
        Ok(())
    }

    /// Overwrite the count. Returns the previous count.
    ///
    /// Nothing is checked: raising the count creates ids with no definition
    /// (they read as an empty name of type `Bool`), lowering it hides
    /// existing definitions until the count grows past them again.
    pub fn set_count(&mut self, count: u64) -> u64 {
        std::mem::replace(&mut self.count, count)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Name of `id`, or the empty string if it has none or is hidden by
    /// the count. Never fails.
    pub fn name(&self, id: AttributeId) -> String {
        self.definition(id)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    /// Declared type of `id`.
    ///
    /// # Errors
    ///
    /// `InvalidAttribute(id)` if `id >= count`.
    pub fn attribute_type(&self, id: AttributeId) -> Result<AttributeType> {
        self.check_id(id)?;
        Ok(self
            .definitions
            .get(&id)
            .map(|d| d.attribute_type)
            .unwrap_or_default())
    }

    /// Fail unless `id` is in range and declared as `expected`.
    pub fn expect_type(&self, id: AttributeId, expected: AttributeType) -> Result<()> {
        if self.attribute_type(id)? != expected {
            return Err(RegistryError::InvalidAttribute(id));
        }
        Ok(())
    }

    /// Fail unless `id < count`.
    pub fn check_id(&self, id: AttributeId) -> Result<()> {
        if id.0 >= self.count {
            return Err(RegistryError::InvalidAttribute(id));
        }
        Ok(())
    }

    /// Look up the stored definition, if any. Ids beyond the count may
    /// still have a hidden definition; this returns only visible ones.
    pub fn definition(&self, id: AttributeId) -> Option<&AttributeDefinition> {
        if id.0 >= self.count {
            return None;
        }
        self.definitions.get(&id)
    }

    /// All visible definitions in id order.
    pub fn definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        let count = self.count;
        self.definitions.values().filter(move |d| d.id.0 < count)
    }

    /// Find the lowest visible id with the given name.
    pub fn find(&self, name: &str) -> Option<AttributeId> {
        self.definitions().find(|d| d.name == name).map(|d| d.id)
    }

    /// Definition at `id`, creating an empty `Bool` one for a slot the
    /// count override left undefined.
    fn slot(&mut self, id: AttributeId) -> &mut AttributeDefinition {
        self.definitions
            .entry(id)
            .or_insert_with(|| AttributeDefinition {
                id,
                name: String::new(),
                attribute_type: AttributeType::default(),
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
