//! Scriptable collaborator mocks shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use bloxlink_bridge::{
    BridgeError, ConnectivityProbe, CredentialSource, DeviceId, SessionBridge,
    SessionCredentials,
};
use bloxlink_registry::{Device, DeviceRegistry};

use crate::coordinator::Coordinator;
use crate::types::{ConnectionStatus, SwitchConfig};

#[derive(Default)]
struct BridgeState {
    init_delay: Mutex<Duration>,
    fail_init: AtomicBool,
    default_reachable: AtomicBool,
    reachable: Mutex<HashMap<DeviceId, bool>>,
    active: Mutex<Option<DeviceId>>,
    started_inits: Mutex<Vec<DeviceId>>,
    completed_inits: Mutex<Vec<DeviceId>>,
    resets: AtomicU32,
    checks: AtomicU32,
}

/// Bridge mock: records calls, honors the cancel token during a configurable
/// init delay, and answers reachability per device (default answer for
/// devices without an override).
pub(crate) struct MockBridge {
    state: Arc<BridgeState>,
}

impl MockBridge {
    pub(crate) fn new() -> Self {
        let state = BridgeState::default();
        state.default_reachable.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    pub(crate) fn set_init_delay(&self, delay: Duration) {
        *self.state.init_delay.lock().unwrap() = delay;
    }

    pub(crate) fn fail_init(&self, fail: bool) {
        self.state.fail_init.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_default_reachable(&self, reachable: bool) {
        self.state.default_reachable.store(reachable, Ordering::SeqCst);
    }

    pub(crate) fn set_reachable(&self, id: &DeviceId, reachable: bool) {
        self.state
            .reachable
            .lock()
            .unwrap()
            .insert(id.clone(), reachable);
    }

    pub(crate) fn started_inits(&self) -> Vec<DeviceId> {
        self.state.started_inits.lock().unwrap().clone()
    }

    pub(crate) fn completed_inits(&self) -> Vec<DeviceId> {
        self.state.completed_inits.lock().unwrap().clone()
    }

    pub(crate) fn reset_count(&self) -> u32 {
        self.state.resets.load(Ordering::SeqCst)
    }

    pub(crate) fn check_count(&self) -> u32 {
        self.state.checks.load(Ordering::SeqCst)
    }
}

impl SessionBridge for MockBridge {
    fn reset_session(&self) {
        self.state.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn init_session(
        &self,
        _credentials: SessionCredentials,
        target: DeviceId,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<(), BridgeError>> {
        let state = self.state.clone();
        Box::pin(async move {
            state.started_inits.lock().unwrap().push(target.clone());
            let delay = *state.init_delay.lock().unwrap();
            if delay.is_zero() {
                if cancel.is_cancelled() {
                    return Err(BridgeError::Cancelled);
                }
            } else {
                tokio::select! {
                    () = cancel.cancelled() => return Err(BridgeError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }
            if state.fail_init.load(Ordering::SeqCst) {
                return Err(BridgeError::Init("mock init failure".into()));
            }
            *state.active.lock().unwrap() = Some(target.clone());
            state.completed_inits.lock().unwrap().push(target);
            Ok(())
        })
    }

    fn check_connection(&self) -> BoxFuture<'static, Result<bool, BridgeError>> {
        let state = self.state.clone();
        Box::pin(async move {
            state.checks.fetch_add(1, Ordering::SeqCst);
            let active = state.active.lock().unwrap().clone();
            let fallback = state.default_reachable.load(Ordering::SeqCst);
            let answer = active
                .and_then(|id| state.reachable.lock().unwrap().get(&id).copied())
                .unwrap_or(fallback);
            Ok(answer)
        })
    }
}

pub(crate) struct MockCredentials {
    credentials: Mutex<Option<SessionCredentials>>,
}

impl MockCredentials {
    pub(crate) fn new() -> Self {
        Self {
            credentials: Mutex::new(Some(SessionCredentials {
                secret: "test-secret".into(),
                derived_auth: "test-auth".into(),
            })),
        }
    }

    pub(crate) fn clear(&self) {
        *self.credentials.lock().unwrap() = None;
    }
}

impl CredentialSource for MockCredentials {
    fn credentials(&self) -> Option<SessionCredentials> {
        self.credentials.lock().unwrap().clone()
    }
}

pub(crate) struct MockProbe {
    reachable: AtomicBool,
}

impl MockProbe {
    pub(crate) fn reachable() -> Self {
        Self {
            reachable: AtomicBool::new(true),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            reachable: AtomicBool::new(false),
        }
    }
}

impl ConnectivityProbe for MockProbe {
    fn is_network_reachable(&self) -> BoxFuture<'static, bool> {
        let answer = self.reachable.load(Ordering::SeqCst);
        Box::pin(async move { answer })
    }
}

/// Registry plus mocks wired up for a coordinator under test.
pub(crate) struct TestRig {
    pub(crate) registry: Arc<DeviceRegistry>,
    pub(crate) bridge: Arc<MockBridge>,
    pub(crate) credentials: Arc<MockCredentials>,
    pub(crate) probe: Arc<MockProbe>,
    pub(crate) config: SwitchConfig,
}

impl TestRig {
    pub(crate) fn new(ids: &[&str]) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        for id in ids {
            registry
                .register(Device::new(*id, format!("Blox {id}")))
                .unwrap();
        }
        Self {
            registry,
            bridge: Arc::new(MockBridge::new()),
            credentials: Arc::new(MockCredentials::new()),
            probe: Arc::new(MockProbe::reachable()),
            config: SwitchConfig::default(),
        }
    }

    pub(crate) fn coordinator(&self) -> Coordinator {
        Coordinator::new(
            self.registry.clone(),
            self.bridge.clone(),
            self.credentials.clone(),
            self.probe.clone(),
            self.config.clone(),
        )
    }
}

/// Polls the store (driving the paused clock) until `id` settles.
pub(crate) async fn settle(coordinator: &Coordinator, id: &DeviceId) -> ConnectionStatus {
    for _ in 0..5000 {
        if let Some(status) = coordinator.status(id)
            && status.is_terminal()
        {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("device {id} never settled");
}
