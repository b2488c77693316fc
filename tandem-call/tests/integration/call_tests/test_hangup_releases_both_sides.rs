use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;
use tandem_core::model::SignalMessage;

use crate::integration::{init_tracing, ready_pair};
use crate::utils::{settle, wait_for_signal, wait_for_state};

#[tokio::test]
async fn test_hangup_releases_both_sides() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (alice, bob) = ready_pair(&relay, "short-call")
        .await
        .expect("pair should seat");

    alice.start_call().await.expect("start_call should send");
    wait_for_state(&bob, RoomState::Ringing)
        .await
        .expect("callee should ring");
    bob.accept_call().await.expect("accept_call should send");
    wait_for_state(&alice, RoomState::Connecting)
        .await
        .expect("caller should start negotiating");

    alice.end_call().await.expect("end_call should send");

    // One hangup word unwinds the call on both sides and both seats
    // are given back.
    let room = "short-call".into();
    wait_for_signal(&relay, &room, |s| matches!(s, SignalMessage::Hangup))
        .await
        .expect("hangup should cross the relay");
    wait_for_state(&alice, RoomState::Ended)
        .await
        .expect("caller should end");
    wait_for_state(&bob, RoomState::Ended)
        .await
        .expect("callee should end");
    settle().await;
    assert_eq!(relay.member_count(&room), 0);

    // Hanging up again finds nothing left to tear down.
    alice.end_call().await.expect("end_call should send");
    settle().await;
    assert_eq!(alice.snapshot().state, RoomState::Ended);
}
