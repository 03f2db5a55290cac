//! Sequential sweep refreshing every known device's reachability.
//!
//! Only one session can be live at a time, so checking a non-current device
//! requires physically switching to it. The sweep walks the registry in
//! registration order, waits for each switch to settle (bounded by a
//! wall-clock timeout), and switches back to the original device at the end.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use bloxlink_bridge::DeviceId;

use crate::coordinator::Coordinator;
use crate::poller;
use crate::types::ConnectionStatus;

/// Clears the busy flag even when the sweep unwinds early.
struct SweepGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Coordinator {
    /// Checks reachability of every registered device, restoring the
    /// original current device afterward.
    ///
    /// Re-entry while a sweep is already running is a no-op. A device that
    /// fails to settle within the configured timeout is skipped rather than
    /// blocking the sweep.
    pub async fn sweep_all(&self) {
        if self.sweep_busy.swap(true, Ordering::SeqCst) {
            debug!("sweep already running, ignoring");
            return;
        }
        let _guard = SweepGuard {
            busy: &self.sweep_busy,
        };

        info!("starting device sweep");

        // The current device keeps its session; check it in place.
        if let Some(current) = self.store.current() {
            self.store.set_status(&current, ConnectionStatus::Checking);
            let reachable = poller::check_reachability(
                &*self.bridge,
                &*self.probe,
                &self.session_ready,
                self.config.check_attempts,
                self.config.check_retry,
            )
            .await;
            let status = if reachable {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            };
            self.store.set_status(&current, status);
        }

        let original = self.store.current();
        for device in self.registry.devices() {
            if original.as_ref() == Some(&device.id) {
                continue;
            }
            self.switch_to(&device.id);
            self.wait_for_settlement(&device.id).await;
        }

        // Put the user's device back.
        if let Some(original) = original
            && self.store.current().as_ref() != Some(&original)
        {
            self.switch_to(&original);
            self.wait_for_settlement(&original).await;
        }

        info!("device sweep complete");
    }

    /// Polls the store until `id` reaches a terminal status or the
    /// settlement timeout elapses. `switch_to` is fire-and-forget, so this
    /// is how the sweep paces itself.
    async fn wait_for_settlement(&self, id: &DeviceId) {
        let deadline = Instant::now() + self.config.settle_timeout;
        loop {
            match self.store.status(id) {
                Some(status) if status.is_terminal() => return,
                // No switch ever started for this device.
                None => return,
                Some(_) => {}
            }
            if Instant::now() >= deadline {
                warn!(blox = %id, "settlement timed out, moving on");
                return;
            }
            tokio::time::sleep(self.config.settle_poll).await;
        }
    }
}
