//! Registry state file — the whole [`RegistryState`] as checksummed JSON.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "format": "idr-state-v1",
//!     "checksum": "<sha256-hex of the canonical state JSON>",
//!     "state": { ... RegistryState ... }
//! }
//! ```
//!
//! The checksum covers `state` serialized through `serde_json::Value`,
//! whose object keys are sorted, so it does not depend on whitespace or
//! key order in the file.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};
use crate::registry::{RegistryState, LAYOUT_VERSION};

// ── File format constants ─────────────────────────────────────────────────────

const STATE_VERSION: u32 = 1;
const STATE_FORMAT: &str = "idr-state-v1";

// ── On-disk structure ─────────────────────────────────────────────────────────

/// Top-level structure written to disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    /// File envelope version.
    pub version: u32,
    /// Format identifier string.
    pub format: String,
    /// SHA-256 of the canonical `state` JSON, hex-encoded.
    pub checksum: String,
    /// Registry tables. Kept untyped until the layout has been checked.
    pub state: serde_json::Value,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Save `state` to `path`.
///
/// The file is written atomically through a sibling temporary file, so a
/// crash mid-write leaves the previous state intact.
pub fn save_state(state: &RegistryState, path: &Path) -> Result<()> {
    let value = serde_json::to_value(state)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    let file = StateFile {
        version: STATE_VERSION,
        format: STATE_FORMAT.to_string(),
        checksum: checksum(&value)?,
        state: value,
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;

    write_atomic(path, json.as_bytes())?;
    info!(
        "saved registry state ({} credentials) to {}",
        state.identities.credential_count(),
        path.display()
    );
    Ok(())
}

/// Load a state file written by [`save_state`].
///
/// # Errors
///
/// - `InvalidFileFormat` for a malformed envelope or unknown format.
/// - `UnsupportedLayout` if the state was written by a newer layout.
/// - `ChecksumMismatch` if the state was altered after saving.
/// - `SerializationError` if the tables do not decode.
/// - `Io` for filesystem errors.
pub fn load_state(path: &Path) -> Result<RegistryState> {
    let bytes = std::fs::read(path)?;
    let file: StateFile = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!("failed to parse state file: {e}"))
    })?;

    if file.version != STATE_VERSION || file.format != STATE_FORMAT {
        return Err(RegistryError::InvalidFileFormat(format!(
            "unsupported state file version={} format={}",
            file.version, file.format,
        )));
    }

    let layout = file
        .state
        .get("layout_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| RegistryError::InvalidFileFormat("missing layout_version".to_string()))?;
    if layout > u64::from(LAYOUT_VERSION) {
        return Err(RegistryError::UnsupportedLayout {
            found: u32::try_from(layout).unwrap_or(u32::MAX),
            supported: LAYOUT_VERSION,
        });
    }

    let actual = checksum(&file.state)?;
    if actual != file.checksum {
        return Err(RegistryError::ChecksumMismatch {
            expected: file.checksum,
            actual,
        });
    }

    let state: RegistryState = serde_json::from_value(file.state)
        .map_err(|e| RegistryError::SerializationError(format!("registry state: {e}")))?;
    debug!(
        "loaded registry state layout={} from {}",
        state.layout_version,
        path.display()
    );
    Ok(state)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn checksum(state: &serde_json::Value) -> Result<String> {
    let canonical =
        serde_json::to_vec(state).map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Write `data` to `path` atomically using a sibling temporary file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
