//! Versioned on-disk snapshot of the bridge state

use std::fs;
use std::path::Path;

use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contract::Bridge;

/// Current snapshot layout
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub state: Bridge,
}

impl Snapshot {
    pub fn new(state: Bridge) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            state,
        }
    }
}

/// Load a bridge from `path`, rejecting unknown schema versions
pub fn load(path: &Path) -> Result<Bridge> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;

    let header: serde_json::Value =
        serde_json::from_str(&raw).wrap_err("Snapshot is not valid JSON")?;
    let version = header
        .get("schema_version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| eyre!("Snapshot has no schema_version"))?;
    if version != SCHEMA_VERSION as u64 {
        return Err(eyre!(
            "Unsupported snapshot schema version {} (expected {})",
            version,
            SCHEMA_VERSION
        ));
    }

    let snapshot: Snapshot = serde_json::from_value(header).wrap_err("Malformed snapshot")?;
    debug!(path = %path.display(), "Snapshot loaded");
    Ok(snapshot.state)
}

/// Write `bridge` to `path` through a temporary file and rename
pub fn save(path: &Path, bridge: &Bridge) -> Result<()> {
    let json = serde_json::to_string_pretty(&Snapshot::new(bridge.clone()))
        .wrap_err("Failed to serialize snapshot")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, json).wrap_err_with(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(tmp, path)
        .wrap_err_with(|| format!("Failed to move snapshot into {}", path.display()))?;

    debug!(path = %path.display(), "Snapshot saved");
    Ok(())
}
