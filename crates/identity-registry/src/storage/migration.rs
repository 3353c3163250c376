//! Layout upgrades.
//!
//! An upgrade runs newer code against the same tables. It may append
//! attribute ids and correct the name or type of existing ones, but never
//! renumbers or drops them, so values written under an old id stay
//! addressable by that id.

use log::info;

use crate::attribute::{AttributeId, AttributeRegistry};
use crate::error::{RegistryError, Result};
use crate::registry::{RegistryState, LAYOUT_VERSION};

/// Differences between two attribute schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Ids defined in the old schema but not visible in the new one.
    pub removed: Vec<AttributeId>,
    /// Ids defined only beyond the old count.
    pub appended: Vec<AttributeId>,
    /// Ids below the old count whose name or type changed.
    pub corrected: Vec<AttributeId>,
    pub old_count: u64,
    pub new_count: u64,
}

impl SchemaDiff {
    /// No definition was dropped and the count did not shrink.
    pub fn is_additive(&self) -> bool {
        self.removed.is_empty() && self.new_count >= self.old_count
    }
}

/// Compare `old` against `new`.
///
/// Walks the stored definitions only, so the cost does not depend on a
/// count forced far past them.
pub fn check_additive(old: &AttributeRegistry, new: &AttributeRegistry) -> SchemaDiff {
    let mut diff = SchemaDiff {
        old_count: old.count(),
        new_count: new.count(),
        ..SchemaDiff::default()
    };
    for before in old.definitions() {
        match new.definition(before.id) {
            None => diff.removed.push(before.id),
            Some(after) if after != before => diff.corrected.push(before.id),
            Some(_) => {}
        }
    }
    for after in new.definitions() {
        if after.id.0 >= old.count() {
            diff.appended.push(after.id);
        } else if old.definition(after.id).is_none() {
            diff.corrected.push(after.id);
        }
    }
    diff.corrected.sort();
    diff
}

/// Accept `candidate` as the upgraded form of `current`.
///
/// The candidate's schema must extend the current one and it must not
/// lose credentials. A candidate on an older layout than this build is
/// lifted to [`LAYOUT_VERSION`] only if `current` authorized that target.
pub fn upgrade_state(current: &RegistryState, mut candidate: RegistryState) -> Result<RegistryState> {
    if candidate.layout_version > LAYOUT_VERSION {
        return Err(RegistryError::UnsupportedLayout {
            found: candidate.layout_version,
            supported: LAYOUT_VERSION,
        });
    }

    let diff = check_additive(&current.attributes, &candidate.attributes);
    if !diff.removed.is_empty() {
        let removed: Vec<String> = diff.removed.iter().map(ToString::to_string).collect();
        return Err(RegistryError::InvalidFileFormat(format!(
            "schema change drops attribute ids [{}]",
            removed.join(", ")
        )));
    }
    if !diff.is_additive() {
        return Err(RegistryError::InvalidFileFormat(format!(
            "attribute count shrinks from {} to {}",
            diff.old_count, diff.new_count
        )));
    }

    if candidate.identities.current_credential_id() < current.identities.current_credential_id() {
        return Err(RegistryError::InvalidFileFormat(format!(
            "credential counter went backwards ({} -> {})",
            current.identities.current_credential_id(),
            candidate.identities.current_credential_id()
        )));
    }

    if candidate.layout_version < LAYOUT_VERSION {
        let authorized = current
            .authorized_layout
            .is_some_and(|target| target >= LAYOUT_VERSION);
        if !authorized {
            return Err(RegistryError::UnsupportedLayout {
                found: candidate.layout_version,
                supported: LAYOUT_VERSION,
            });
        }
        info!(
            "lifting state from layout {} to {LAYOUT_VERSION}",
            candidate.layout_version
        );
        candidate.layout_version = LAYOUT_VERSION;
        candidate.authorized_layout = None;
    }

    info!(
        "accepted upgraded state: {} appended, {} corrected attribute(s)",
        diff.appended.len(),
        diff.corrected.len()
    );
    Ok(candidate)
}
