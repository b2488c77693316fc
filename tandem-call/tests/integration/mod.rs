pub mod call_tests;
pub mod membership_tests;

use std::sync::Arc;
use tracing::Level;

use tandem_call::config::{PeerConfig, SessionConfig};
use tandem_call::device::{DeviceProvider, NullDevices};
use tandem_call::session::{RoomHandle, RoomSession, RoomState};
use tandem_call::signaling::MemoryRelay;

use crate::utils::wait_for_state;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn spawn_member(relay: &Arc<MemoryRelay>, room: &str, name: &str) -> RoomHandle {
    spawn_member_with(relay, room, name, Arc::new(NullDevices))
}

pub fn spawn_member_with(
    relay: &Arc<MemoryRelay>,
    room: &str,
    name: &str,
    devices: Arc<dyn DeviceProvider>,
) -> RoomHandle {
    let (channel, server_rx) = relay.open();
    let config = SessionConfig::new(room, name).with_peer(PeerConfig::none());
    RoomSession::spawn(config, Arc::new(channel), server_rx, devices)
}

/// Two members seated in the same room, both ready to call.
pub async fn ready_pair(
    relay: &Arc<MemoryRelay>,
    room: &str,
) -> anyhow::Result<(RoomHandle, RoomHandle)> {
    let alice = spawn_member(relay, room, "alice");
    wait_for_state(&alice, RoomState::Waiting).await?;
    let bob = spawn_member(relay, room, "bob");
    wait_for_state(&alice, RoomState::CanCall).await?;
    wait_for_state(&bob, RoomState::CanCall).await?;
    Ok((alice, bob))
}
