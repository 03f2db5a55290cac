//! Collaborator interfaces for the Blox connection core.
//!
//! The connection orchestrator drives a native session bridge it does not
//! own. This crate defines the traits that bridge (and the credential and
//! connectivity collaborators) must implement, plus the shared identifier
//! and credential types.

pub mod session;
pub mod types;

// Re-export primary types.
pub use session::{ConnectivityProbe, CredentialSource, SessionBridge};
pub use types::{DeviceId, SessionCredentials};

/// Errors surfaced by the native session bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("session init failed: {0}")]
    Init(String),

    #[error("connection check failed: {0}")]
    Check(String),

    #[error("session init cancelled")]
    Cancelled,
}
