//! Connection orchestration for Blox devices.
//!
//! A single native session handle is shared across every known device, so
//! only one device can be "current" at a time. This crate owns the logic
//! that re-points the session: generation-tagged, debounced, cancellable
//! switches ([`Coordinator::switch_to`]), a per-device status map
//! ([`StatusStore`]), and the sequential sweep that refreshes every
//! device's reachability ([`Coordinator::sweep_all`]).

pub mod coordinator;
pub(crate) mod poller;
pub mod status;
mod sweep;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::Coordinator;
pub use status::StatusStore;
pub use types::{ConnectionStatus, StatusEvent, SwitchConfig};
