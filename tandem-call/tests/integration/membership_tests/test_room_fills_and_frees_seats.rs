use tandem_call::session::RoomState;
use tandem_call::signaling::MemoryRelay;

use crate::integration::{init_tracing, ready_pair, spawn_member};
use crate::utils::{settle, wait_for_state};

#[tokio::test]
async fn test_room_fills_and_frees_seats() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (alice, _bob) = ready_pair(&relay, "crowded")
        .await
        .expect("pair should seat");

    // A third member bounces off without disturbing the seated pair.
    let carol = spawn_member(&relay, "crowded", "carol");
    wait_for_state(&carol, RoomState::Full)
        .await
        .expect("third member should be turned away");
    assert_eq!(relay.member_count(&"crowded".into()), 2);
    assert_eq!(alice.snapshot().state, RoomState::CanCall);

    // Leaving frees the seat for the next joiner.
    alice.shutdown().await.expect("shutdown should be accepted");
    wait_for_state(&alice, RoomState::Ended)
        .await
        .expect("leaver should end its session");
    settle().await;
    assert_eq!(relay.member_count(&"crowded".into()), 1);

    let dave = spawn_member(&relay, "crowded", "dave");
    wait_for_state(&dave, RoomState::CanCall)
        .await
        .expect("freed seat should admit a new member");
    assert_eq!(relay.member_count(&"crowded".into()), 2);
}
