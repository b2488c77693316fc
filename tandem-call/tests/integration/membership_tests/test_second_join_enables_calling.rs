use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;

use crate::integration::{init_tracing, spawn_member};
use crate::utils::wait_for_state;

#[tokio::test]
async fn test_second_join_enables_calling() {
    init_tracing();

    let relay = MemoryRelay::new();
    let alice = spawn_member(&relay, "lobby", "alice");

    // Alone in the room there is nobody to call.
    let snap = wait_for_state(&alice, RoomState::Waiting)
        .await
        .expect("first member should be waiting");
    assert!(snap.peer_name.is_none());
    assert_eq!(relay.member_count(&"lobby".into()), 1);

    let bob = spawn_member(&relay, "lobby", "bob");

    wait_for_state(&alice, RoomState::CanCall)
        .await
        .expect("occupant should see the join");
    wait_for_state(&bob, RoomState::CanCall)
        .await
        .expect("joiner should land ready to call");
    assert_eq!(relay.member_count(&"lobby".into()), 2);
}
