//! Single source of truth for the status map and the current-device pointer.
//!
//! Writes are unconditional; the coordinator enforces which operation may
//! commit a terminal status. Methods are synchronous so a switch's fast
//! phase never yields between its writes.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use tokio::sync::mpsc;

use bloxlink_bridge::DeviceId;

use crate::types::{ConnectionStatus, StatusEvent};

pub struct StatusStore {
    statuses: RwLock<HashMap<DeviceId, ConnectionStatus>>,
    current: RwLock<Option<DeviceId>>,
    events_tx: mpsc::Sender<StatusEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<StatusEvent>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        Self {
            statuses: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&self) -> Option<mpsc::Receiver<StatusEvent>> {
        self.events_rx.lock().unwrap().take()
    }

    pub fn status(&self, id: &DeviceId) -> Option<ConnectionStatus> {
        self.statuses.read().unwrap().get(id).copied()
    }

    /// Returns a snapshot of the full status map.
    pub fn statuses(&self) -> HashMap<DeviceId, ConnectionStatus> {
        self.statuses.read().unwrap().clone()
    }

    pub fn current(&self) -> Option<DeviceId> {
        self.current.read().unwrap().clone()
    }

    /// Unconditional status write; notifies subscribers.
    pub fn set_status(&self, id: &DeviceId, status: ConnectionStatus) {
        self.statuses
            .write()
            .unwrap()
            .insert(id.clone(), status);
        let _ = self.events_tx.try_send(StatusEvent::StatusChanged {
            device_id: id.clone(),
            status,
        });
    }

    /// Unconditional current-pointer write; notifies subscribers.
    pub fn set_current(&self, id: DeviceId) {
        *self.current.write().unwrap() = Some(id.clone());
        let _ = self
            .events_tx
            .try_send(StatusEvent::CurrentChanged { device_id: id });
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
