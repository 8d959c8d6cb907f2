use crate::utils::{FakeClient, create_test_room, settle};
use std::time::Duration;
use switchboard_core::{JoinOutcome, ParticipantId};
use switchboard_server::room::RECONNECT_GRACE;

#[tokio::test(start_paused = true)]
async fn test_reconnect_within_grace_keeps_membership() {
    let room = create_test_room();

    let a = ParticipantId::generate();
    let b = ParticipantId::generate();
    assert_eq!(room.handle.room().join(a.clone()), JoinOutcome::Joined);
    assert_eq!(room.handle.room().join(b.clone()), JoinOutcome::Joined);

    let mut alice = FakeClient::connect(&room.handle, a.clone()).await;
    let bob = FakeClient::connect(&room.handle, b.clone()).await;
    settle().await;
    alice.drain();

    bob.disconnect(&room.handle).await;
    settle().await;

    // Disconnect is visible immediately, but membership survives the blip.
    let connected = alice.expect_info().await;
    assert_eq!(connected.get(&b), Some(&false));
    assert!(room.handle.room().contains(&b));

    tokio::time::advance(RECONNECT_GRACE - Duration::from_secs(1)).await;
    settle().await;

    let mut bob = FakeClient::connect(&room.handle, b.clone()).await;
    settle().await;

    tokio::time::advance(RECONNECT_GRACE * 2).await;
    settle().await;

    assert!(room.handle.room().contains(&b));
    let connected = bob.expect_info().await;
    assert_eq!(connected.get(&b), Some(&true));
}

#[tokio::test(start_paused = true)]
async fn test_staying_disconnected_past_grace_removes_membership() {
    let room = create_test_room();

    let a = ParticipantId::generate();
    let b = ParticipantId::generate();
    room.handle.room().join(a.clone());
    room.handle.room().join(b.clone());

    let mut alice = FakeClient::connect(&room.handle, a.clone()).await;
    let bob = FakeClient::connect(&room.handle, b.clone()).await;
    settle().await;
    alice.drain();

    bob.disconnect(&room.handle).await;
    settle().await;
    alice.drain();

    tokio::time::advance(RECONNECT_GRACE + Duration::from_secs(1)).await;
    settle().await;

    assert!(!room.handle.room().contains(&b));
    let connected = alice.expect_info().await;
    assert!(!connected.contains_key(&b));
    assert_eq!(connected.get(&a), Some(&true));
}
