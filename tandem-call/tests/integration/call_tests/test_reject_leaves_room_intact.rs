use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;

use crate::integration::{init_tracing, ready_pair};
use crate::utils::wait_for_state;

#[tokio::test]
async fn test_reject_leaves_room_intact() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (alice, bob) = ready_pair(&relay, "declined")
        .await
        .expect("pair should seat");

    alice.start_call().await.expect("start_call should send");
    wait_for_state(&alice, RoomState::Calling)
        .await
        .expect("caller should ring out");
    let snap = wait_for_state(&bob, RoomState::Ringing)
        .await
        .expect("callee should ring");
    assert_eq!(snap.peer_name.as_deref(), Some("alice"));

    bob.reject_call().await.expect("reject_call should send");

    // The callee drops back to waiting, the caller learns the outcome,
    // and neither gives up its seat.
    let snap = wait_for_state(&bob, RoomState::Waiting)
        .await
        .expect("callee should drop back to waiting");
    assert!(snap.peer_name.is_none());
    wait_for_state(&alice, RoomState::Rejected)
        .await
        .expect("caller should see the rejection");
    assert_eq!(relay.member_count(&"declined".into()), 2);

    // A rejoin by the rejected caller reseats the pair for another try.
    alice.rejoin().await.expect("rejoin should send");
    wait_for_state(&alice, RoomState::CanCall)
        .await
        .expect("rejected caller should be ready again");
    wait_for_state(&bob, RoomState::CanCall)
        .await
        .expect("waiting callee should be ready again");
}
