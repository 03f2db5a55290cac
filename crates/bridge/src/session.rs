//! Traits the native session bridge and its sibling collaborators implement.
//!
//! The bridge owns a single logical session handle shared across all known
//! devices; the connection core re-points it by calling `reset_session`
//! followed by `init_session` for the new target. All methods returning
//! futures use [`BoxFuture`] so the core can hold the collaborators as
//! `Arc<dyn …>` and tests can inject mocks.

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::BridgeError;
use crate::types::{DeviceId, SessionCredentials};

/// Native session client bound to at most one device at a time.
pub trait SessionBridge: Send + Sync {
    /// Invalidates any in-flight or established session. Idempotent.
    fn reset_session(&self);

    /// Establishes a session bound to `target`.
    ///
    /// The bridge should consult `cancel` opportunistically and abort early
    /// once it is cancelled; a late completion after cancellation is
    /// tolerated (the caller discards superseded results).
    fn init_session(
        &self,
        credentials: SessionCredentials,
        target: DeviceId,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<(), BridgeError>>;

    /// Single reachability probe against the currently initialized session.
    fn check_connection(&self) -> BoxFuture<'static, Result<bool, BridgeError>>;
}

/// External store holding the user's session credentials.
pub trait CredentialSource: Send + Sync {
    /// Returns the credentials, or `None` if the user has none stored.
    fn credentials(&self) -> Option<SessionCredentials>;
}

/// Coarse network connectivity probe, checked before any session probe.
pub trait ConnectivityProbe: Send + Sync {
    fn is_network_reachable(&self) -> BoxFuture<'static, bool>;
}
