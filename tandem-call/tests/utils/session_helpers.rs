use anyhow::{Context, Result};
use std::time::Duration;

use tandem_call::session::{RoomHandle, RoomSnapshot, RoomState};
use tandem_call::signaling::MemoryRelay;
use tandem_core::model::{RoomName, SignalMessage};

/// Timeout for room state transitions (ms).
pub const STATE_TIMEOUT_MS: u64 = 5000;

/// Timeout for media-driven transitions, which sit behind a full ICE
/// and DTLS handshake (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 10000;

/// Settle time before asserting that nothing changed (ms).
pub const SETTLE_MS: u64 = 100;

/// Wait until the session publishes the wanted state.
pub async fn wait_for_state(handle: &RoomHandle, want: RoomState) -> Result<RoomSnapshot> {
    wait_for_state_within(handle, want, STATE_TIMEOUT_MS).await
}

pub async fn wait_for_state_within(
    handle: &RoomHandle,
    want: RoomState,
    timeout_ms: u64,
) -> Result<RoomSnapshot> {
    let mut rx = handle.watch();
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        loop {
            {
                let snap = rx.borrow_and_update().clone();
                if snap.state == want {
                    return Ok(snap);
                }
            }
            rx.changed().await.context("Session task stopped")?;
        }
    })
    .await
    .with_context(|| format!("Timeout waiting for state {want}"))?
}

/// Wait until the relay has routed a signal matching the predicate.
pub async fn wait_for_signal(
    relay: &MemoryRelay,
    room: &RoomName,
    matches: impl Fn(&SignalMessage) -> bool,
) -> Result<()> {
    tokio::time::timeout(Duration::from_millis(STATE_TIMEOUT_MS), async {
        loop {
            if relay.routed_signals(room).await.iter().any(&matches) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .context("Timeout waiting for signal")
}

/// Give in-flight events time to land, then return.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(SETTLE_MS)).await;
}
