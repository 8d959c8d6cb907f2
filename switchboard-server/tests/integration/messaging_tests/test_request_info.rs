use crate::utils::{FakeClient, create_test_room, settle};
use switchboard_core::{ClientMessage, ParticipantId};

#[tokio::test]
async fn test_snapshot_goes_only_to_the_requester() {
    let room = create_test_room();

    let a = ParticipantId::generate();
    let b = ParticipantId::generate();
    let c = ParticipantId::generate();
    room.handle.room().join(a.clone());
    room.handle.room().join(b.clone());
    room.handle.room().join(c.clone());

    let mut alice = FakeClient::connect(&room.handle, a.clone()).await;
    let mut bob = FakeClient::connect(&room.handle, b.clone()).await;
    settle().await;
    alice.drain();
    bob.drain();

    alice.send(&room.handle, ClientMessage::RequestInfo).await;
    settle().await;

    // Every member appears, flagged by connection liveness; Carol joined but
    // never connected.
    let connected = alice.expect_info().await;
    assert_eq!(connected.len(), 3);
    assert_eq!(connected.get(&a), Some(&true));
    assert_eq!(connected.get(&b), Some(&true));
    assert_eq!(connected.get(&c), Some(&false));

    bob.assert_silent();
}
