//! Registry of known Blox devices.
//!
//! Holds the user's registered devices in registration order (the sweep
//! iterates them in this order) and provides the versioned JSON snapshot
//! loader used to restore the device list and the current-device pointer
//! across restarts.

pub mod device;
pub mod snapshot;

pub use device::{Device, DeviceRegistry};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError, SnapshotStore};

use bloxlink_bridge::DeviceId;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("device already registered: {0}")]
    DuplicateDevice(DeviceId),

    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),
}
