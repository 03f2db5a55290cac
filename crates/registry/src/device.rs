//! Device records and the in-memory registry.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use bloxlink_bridge::DeviceId;

use crate::RegistryError;

/// A physical storage node the user has registered.
///
/// Immutable after registration except for `display_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub display_name: String,
    /// Secondary identifier some device generations expose (e.g. the relay
    /// peer id); not every device has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary_id: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            auxiliary_id: None,
        }
    }
}

/// Insertion-ordered registry of known devices.
///
/// Registration order is observable: the sweep visits devices in the order
/// they were registered.
pub struct DeviceRegistry {
    devices: RwLock<Vec<Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
        }
    }

    /// Builds a registry from an existing device list (snapshot restore).
    /// Later duplicates of the same id are dropped.
    pub fn from_devices(devices: Vec<Device>) -> Self {
        let mut seen: Vec<Device> = Vec::with_capacity(devices.len());
        for device in devices {
            if !seen.iter().any(|d| d.id == device.id) {
                seen.push(device);
            }
        }
        Self {
            devices: RwLock::new(seen),
        }
    }

    /// Registers a new device. Fails if the id is already registered.
    pub fn register(&self, device: Device) -> Result<(), RegistryError> {
        let mut devices = self.devices.write().unwrap();
        if devices.iter().any(|d| d.id == device.id) {
            return Err(RegistryError::DuplicateDevice(device.id));
        }
        devices.push(device);
        Ok(())
    }

    /// Removes a device, returning its record.
    pub fn unregister(&self, id: &DeviceId) -> Result<Device, RegistryError> {
        let mut devices = self.devices.write().unwrap();
        let pos = devices
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| RegistryError::UnknownDevice(id.clone()))?;
        Ok(devices.remove(pos))
    }

    /// Updates a device's display name.
    pub fn rename(&self, id: &DeviceId, display_name: &str) -> Result<(), RegistryError> {
        let mut devices = self.devices.write().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| RegistryError::UnknownDevice(id.clone()))?;
        device.display_name = display_name.to_string();
        Ok(())
    }

    pub fn get(&self, id: &DeviceId) -> Option<Device> {
        self.devices
            .read()
            .unwrap()
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.read().unwrap().iter().any(|d| &d.id == id)
    }

    /// Returns all devices in registration order.
    pub fn devices(&self) -> Vec<Device> {
        self.devices.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.devices.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().unwrap().is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
