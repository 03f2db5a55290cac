//! Single-device reachability check against the live session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use bloxlink_bridge::{ConnectivityProbe, SessionBridge};

/// Probes whether the currently initialized session's device answers.
///
/// Returns `false` immediately when no session is ready (distinguishing
/// "no session" from "unreachable" is the caller's concern; both read as
/// not reachable here) or when the network itself is down. Otherwise tries
/// up to `max_attempts` probes, sleeping `retry_delay` between failures.
/// Never mutates status; the caller commits the result.
pub(crate) async fn check_reachability(
    bridge: &dyn SessionBridge,
    probe: &dyn ConnectivityProbe,
    session_ready: &AtomicBool,
    max_attempts: u32,
    retry_delay: Duration,
) -> bool {
    if !session_ready.load(Ordering::SeqCst) {
        debug!("no session ready, skipping reachability check");
        return false;
    }
    if !probe.is_network_reachable().await {
        debug!("network unreachable, skipping reachability check");
        return false;
    }

    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        match bridge.check_connection().await {
            Ok(true) => return true,
            Ok(false) => debug!(attempt, "device did not answer"),
            Err(e) => warn!(attempt, error = %e, "connection check failed"),
        }
        if attempt < attempts {
            tokio::time::sleep(retry_delay).await;
        }
    }
    false
}
