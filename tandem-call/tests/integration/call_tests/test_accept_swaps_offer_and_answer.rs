use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;
use tandem_core::model::SignalMessage;

use crate::integration::{init_tracing, ready_pair};
use crate::utils::{wait_for_signal, wait_for_state};

#[tokio::test]
async fn test_accept_swaps_offer_and_answer() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (alice, bob) = ready_pair(&relay, "handshake")
        .await
        .expect("pair should seat");

    alice.start_call().await.expect("start_call should send");
    wait_for_state(&bob, RoomState::Ringing)
        .await
        .expect("callee should ring");
    bob.accept_call().await.expect("accept_call should send");

    let snap = wait_for_state(&alice, RoomState::Connecting)
        .await
        .expect("caller should start negotiating");
    assert_eq!(snap.peer_name.as_deref(), Some("bob"));
    wait_for_state(&bob, RoomState::Connecting)
        .await
        .expect("callee should start negotiating");

    // The inviter describes first, the acceptor responds.
    let room = "handshake".into();
    wait_for_signal(&relay, &room, |s| matches!(s, SignalMessage::Offer { .. }))
        .await
        .expect("offer should cross the relay");
    wait_for_signal(&relay, &room, |s| matches!(s, SignalMessage::Answer { .. }))
        .await
        .expect("answer should cross the relay");

    let signals = relay.routed_signals(&room).await;
    let offers = signals
        .iter()
        .filter(|s| matches!(s, SignalMessage::Offer { .. }))
        .count();
    assert_eq!(offers, 1, "only the inviter should send an offer");
}
