use std::sync::Arc;
use std::time::Duration;

use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;

use crate::integration::{init_tracing, spawn_member, spawn_member_with};
use crate::utils::{CONNECTION_TIMEOUT_MS, MockMediaSource, wait_for_state, wait_for_state_within};

#[tokio::test]
async fn test_media_flow_marks_callee_connected() {
    init_tracing();

    let relay = MemoryRelay::new();
    let mic = Arc::new(MockMediaSource::new());
    let alice = spawn_member_with(&relay, "live", "alice", mic.clone());
    wait_for_state(&alice, RoomState::Waiting)
        .await
        .expect("first member should be waiting");
    let bob = spawn_member(&relay, "live", "bob");
    wait_for_state(&alice, RoomState::CanCall)
        .await
        .expect("occupant should see the join");
    wait_for_state(&bob, RoomState::CanCall)
        .await
        .expect("joiner should land ready to call");

    alice.start_call().await.expect("start_call should send");
    wait_for_state(&bob, RoomState::Ringing)
        .await
        .expect("callee should ring");
    bob.accept_call().await.expect("accept_call should send");
    wait_for_state(&alice, RoomState::Connecting)
        .await
        .expect("caller should start negotiating");

    // Push silence through the caller's track until RTP reaches the
    // callee. Receiving the first remote track is what flips the
    // callee to connected.
    let pump = mic.pump_for(Duration::from_millis(CONNECTION_TIMEOUT_MS));
    let snap = wait_for_state_within(&bob, RoomState::Connected, CONNECTION_TIMEOUT_MS)
        .await
        .expect("callee should go live once media lands");
    assert!(!snap.remote_tracks.is_empty());

    // The caller receives nothing back and keeps negotiating.
    assert_eq!(alice.snapshot().state, RoomState::Connecting);

    pump.abort();
    alice.end_call().await.expect("end_call should send");
    wait_for_state(&bob, RoomState::Ended)
        .await
        .expect("callee should end");
}
