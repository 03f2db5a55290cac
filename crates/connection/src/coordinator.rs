//! Switch coordinator: re-points the shared session at a new device.
//!
//! Every switch request takes a fresh generation from a monotonic counter.
//! The synchronous fast phase moves the current-device pointer and marks the
//! target `Switching`; the spawned slow phase debounces, resets the bridge,
//! opens the new session, and commits a terminal status — re-checking at
//! each suspension point that no newer switch has superseded it. A
//! superseded operation marks its own target `Disconnected` unless a
//! strictly newer switch claims that same device (the user switched
//! A→B→A faster than B settled).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bloxlink_bridge::{
    BridgeError, ConnectivityProbe, CredentialSource, DeviceId, SessionBridge,
};
use bloxlink_registry::DeviceRegistry;

use crate::poller;
use crate::status::StatusStore;
use crate::types::{ConnectionStatus, SwitchConfig};

/// Internal slow-phase outcome. `Superseded` is control flow, not failure.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SwitchError {
    #[error("superseded by a newer switch")]
    Superseded,

    #[error("no session credentials available")]
    MissingCredentials,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Orchestrates device switches and sweeps over a shared session bridge.
pub struct Coordinator {
    pub(crate) registry: Arc<DeviceRegistry>,
    pub(crate) store: Arc<StatusStore>,
    pub(crate) bridge: Arc<dyn SessionBridge>,
    pub(crate) credentials: Arc<dyn CredentialSource>,
    pub(crate) probe: Arc<dyn ConnectivityProbe>,
    pub(crate) config: SwitchConfig,
    /// Monotonic counter ordering switch requests.
    generation: Arc<AtomicU64>,
    /// Device claimed by the newest switch, with its generation.
    latest_claim: Arc<Mutex<Option<(DeviceId, u64)>>>,
    /// True once a session is initialized and not yet torn down.
    pub(crate) session_ready: Arc<AtomicBool>,
    /// Cancel token for the in-flight switch's bridge work.
    switch_cancel: Mutex<Option<CancellationToken>>,
    /// Guards against a second concurrent sweep.
    pub(crate) sweep_busy: Arc<AtomicBool>,
}

impl Coordinator {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        bridge: Arc<dyn SessionBridge>,
        credentials: Arc<dyn CredentialSource>,
        probe: Arc<dyn ConnectivityProbe>,
        config: SwitchConfig,
    ) -> Self {
        Self {
            registry,
            store: Arc::new(StatusStore::new()),
            bridge,
            credentials,
            probe,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            latest_claim: Arc::new(Mutex::new(None)),
            session_ready: Arc::new(AtomicBool::new(false)),
            switch_cancel: Mutex::new(None),
            sweep_busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The status store backing this coordinator.
    pub fn store(&self) -> Arc<StatusStore> {
        self.store.clone()
    }

    pub fn status(&self, id: &DeviceId) -> Option<ConnectionStatus> {
        self.store.status(id)
    }

    pub fn current_device(&self) -> Option<DeviceId> {
        self.store.current()
    }

    /// Takes the status event receiver. Can only be called once.
    pub fn take_events(&self) -> Option<tokio::sync::mpsc::Receiver<crate::types::StatusEvent>> {
        self.store.take_events()
    }

    pub fn is_session_ready(&self) -> bool {
        self.session_ready.load(Ordering::SeqCst)
    }

    /// Switches the current device to `id`. Fire-and-forget: completion is
    /// observed through the status store.
    ///
    /// The pointer move and the `Switching` status land synchronously;
    /// session re-init and the reachability check run on a spawned task.
    /// Switching to the already-current device is a no-op. Must be called
    /// from within a tokio runtime.
    pub fn switch_to(&self, id: &DeviceId) {
        if !self.registry.contains(id) {
            warn!(blox = %id, "switch requested for unregistered device");
            return;
        }
        if self.store.current().as_ref() == Some(id) {
            debug!(blox = %id, "already current, ignoring switch");
            return;
        }

        // Fast phase. Claim + cancel swap under one lock so two racing
        // switches cannot interleave their claims.
        let (generation, cancel) = {
            let mut claim = self.latest_claim.lock().unwrap();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *claim = Some((id.clone(), generation));

            let mut slot = self.switch_cancel.lock().unwrap();
            if let Some(previous) = slot.take() {
                previous.cancel();
            }
            let cancel = CancellationToken::new();
            *slot = Some(cancel.clone());
            (generation, cancel)
        };

        self.session_ready.store(false, Ordering::SeqCst);
        self.store.set_current(id.clone());
        self.store.set_status(id, ConnectionStatus::Switching);
        info!(blox = %id, generation, "switching current device");

        let ctx = self.switch_context();
        let device = id.clone();
        tokio::spawn(async move {
            drive_switch(ctx, generation, device, cancel).await;
        });
    }

    pub(crate) fn switch_context(&self) -> SwitchContext {
        SwitchContext {
            store: self.store.clone(),
            bridge: self.bridge.clone(),
            credentials: self.credentials.clone(),
            probe: self.probe.clone(),
            config: self.config.clone(),
            generation: self.generation.clone(),
            latest_claim: self.latest_claim.clone(),
            session_ready: self.session_ready.clone(),
        }
    }
}

/// Shared state handed to the spawned slow phase.
#[derive(Clone)]
pub(crate) struct SwitchContext {
    pub(crate) store: Arc<StatusStore>,
    pub(crate) bridge: Arc<dyn SessionBridge>,
    pub(crate) credentials: Arc<dyn CredentialSource>,
    pub(crate) probe: Arc<dyn ConnectivityProbe>,
    pub(crate) config: SwitchConfig,
    pub(crate) generation: Arc<AtomicU64>,
    pub(crate) latest_claim: Arc<Mutex<Option<(DeviceId, u64)>>>,
    pub(crate) session_ready: Arc<AtomicBool>,
}

fn superseded(ctx: &SwitchContext, generation: u64) -> bool {
    ctx.generation.load(Ordering::SeqCst) != generation
}

/// Gives up a superseded switch's claim on `device`.
///
/// Marks the device `Disconnected` unless a strictly newer switch has
/// re-claimed the same device, in which case its in-progress status is
/// left alone.
fn abandon(ctx: &SwitchContext, generation: u64, device: &DeviceId) {
    {
        let claim = ctx.latest_claim.lock().unwrap();
        if let Some((claimed, newer)) = claim.as_ref()
            && claimed == device
            && *newer > generation
        {
            debug!(
                blox = %device,
                generation,
                newer,
                "newer switch re-claimed this device, leaving status alone"
            );
            return;
        }
    }
    ctx.store.set_status(device, ConnectionStatus::Disconnected);
}

/// Runs the slow phase and absorbs every failure into a status transition.
/// Nothing propagates to the caller.
pub(crate) async fn drive_switch(
    ctx: SwitchContext,
    generation: u64,
    device: DeviceId,
    cancel: CancellationToken,
) {
    match run_switch(&ctx, generation, &device, cancel).await {
        Ok(()) => {}
        Err(SwitchError::Superseded) => abandon(&ctx, generation, &device),
        Err(e) => {
            warn!(blox = %device, generation, error = %e, "switch failed");
            if superseded(&ctx, generation) {
                abandon(&ctx, generation, &device);
            } else {
                ctx.store.set_status(&device, ConnectionStatus::Disconnected);
                ctx.session_ready.store(false, Ordering::SeqCst);
            }
        }
    }
}

async fn run_switch(
    ctx: &SwitchContext,
    generation: u64,
    device: &DeviceId,
    cancel: CancellationToken,
) -> Result<(), SwitchError> {
    // Debounce: a burst of rapid switches collapses into the newest one
    // before any expensive bridge call starts.
    tokio::time::sleep(ctx.config.debounce).await;
    if superseded(ctx, generation) {
        return Err(SwitchError::Superseded);
    }

    // Free the single session handle for the new target.
    ctx.bridge.reset_session();
    if superseded(ctx, generation) {
        return Err(SwitchError::Superseded);
    }

    let credentials = ctx
        .credentials
        .credentials()
        .ok_or(SwitchError::MissingCredentials)?;

    ctx.bridge
        .init_session(credentials, device.clone(), cancel)
        .await?;
    if superseded(ctx, generation) {
        return Err(SwitchError::Superseded);
    }

    ctx.session_ready.store(true, Ordering::SeqCst);
    ctx.store.set_status(device, ConnectionStatus::Checking);

    let reachable = poller::check_reachability(
        &*ctx.bridge,
        &*ctx.probe,
        &ctx.session_ready,
        ctx.config.check_attempts,
        ctx.config.check_retry,
    )
    .await;
    if superseded(ctx, generation) {
        return Err(SwitchError::Superseded);
    }

    let status = if reachable {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Disconnected
    };
    info!(blox = %device, generation, ?status, "switch settled");
    ctx.store.set_status(device, status);
    Ok(())
}
