//! Versioned JSON snapshot of the device list and current-device pointer.
//!
//! The snapshot is read once at startup and written on change by the caller;
//! the connection coordinator itself never touches disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use bloxlink_bridge::DeviceId;

use crate::device::Device;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from snapshot load/save.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Persisted state: registered devices plus the last current device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub devices: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_device: Option<DeviceId>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            devices: Vec::new(),
            current_device: None,
        }
    }
}

/// Loads and saves [`Snapshot`]s at a fixed path.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot from disk. A missing file loads as empty.
    pub fn load(&self) -> Result<Snapshot, SnapshotError> {
        if !self.path.exists() {
            return Ok(Snapshot::empty());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        debug!(
            devices = snapshot.devices.len(),
            "loaded snapshot from {:?}", self.path
        );
        Ok(snapshot)
    }

    /// Writes the snapshot to disk, creating parent directories as needed.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        debug!(
            devices = snapshot.devices.len(),
            "persisted snapshot to {:?}", self.path
        );
        Ok(())
    }
}
