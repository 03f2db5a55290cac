//! Public types for the connection orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bloxlink_bridge::DeviceId;

/// Connection status of a known device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Session established and the device answered a reachability probe.
    Connected,
    /// Session established, reachability probe in progress.
    Checking,
    /// A switch to this device is in flight.
    Switching,
    /// No session, or the device did not answer.
    Disconnected,
}

impl ConnectionStatus {
    /// `true` for the two states a settled switch ends in.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }
}

/// Events emitted by the status store.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// A device's connection status changed.
    StatusChanged {
        device_id: DeviceId,
        status: ConnectionStatus,
    },
    /// The current-device pointer moved.
    CurrentChanged { device_id: DeviceId },
}

/// Timing configuration for switches and sweeps.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    /// Debounce before a switch starts driving the bridge, so a burst of
    /// rapid switches collapses into the newest one.
    pub debounce: Duration,
    /// Reachability attempts after a switch (tuned for responsiveness).
    pub check_attempts: u32,
    /// Delay between reachability attempts.
    pub check_retry: Duration,
    /// Wall-clock cap on waiting for one device to settle during a sweep.
    pub settle_timeout: Duration,
    /// Interval between settlement polls during a sweep.
    pub settle_poll: Duration,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            check_attempts: 1,
            check_retry: Duration::from_secs(5),
            settle_timeout: Duration::from_secs(60),
            settle_poll: Duration::from_millis(250),
        }
    }
}
