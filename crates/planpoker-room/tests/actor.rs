//! Tests for the coordinator actor running on a real (paused) Tokio clock.

use std::time::Duration;

use planpoker_protocol::{ParticipantId, RawVote, RoomId, ServerEvent, VoteValue};
use planpoker_room::{spawn_coordinator, RoomConfig, RoomError, DEFAULT_CHANNEL_SIZE};
use tokio::sync::mpsc;

fn r1() -> RoomId {
    RoomId::from("R1")
}

fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_joiner_receives_own_update() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle.join(r1(), pid("a"), "Alice".into(), tx).await.unwrap();

    let event = rx.recv().await.unwrap();
    let ServerEvent::RoomUpdate(view) = event else {
        panic!("expected room_update, got {event:?}");
    };
    assert_eq!(view.users.len(), 1);
    assert_eq!(view.host_id, Some(pid("a")));
}

#[tokio::test]
async fn test_broadcast_reaches_all_members() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx_a).await.unwrap();
    handle.join(r1(), pid("b"), "B".into(), tx_b).await.unwrap();

    handle.vote(r1(), pid("a"), RawVote::from(3)).await.unwrap();
    handle.vote(r1(), pid("b"), RawVote::from(5)).await.unwrap();
    // Round-trip through the actor so the votes are applied.
    handle.get_room(r1()).await.unwrap();

    let last_a = drain(&mut rx_a).pop().unwrap();
    let last_b = drain(&mut rx_b).pop().unwrap();
    assert_eq!(last_a, last_b);
    assert_eq!(last_a.name(), "vote_reveal");
}

#[tokio::test]
async fn test_full_room_rejects_and_unsubscribes() {
    let config = RoomConfig {
        max_participants: 1,
        ..RoomConfig::default()
    };
    let handle = spawn_coordinator(config, DEFAULT_CHANNEL_SIZE);
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx_a).await.unwrap();

    let err = handle.join(r1(), pid("b"), "B".into(), tx_b).await.unwrap_err();
    assert!(matches!(err, RoomError::RoomFull { capacity: 1, .. }));

    handle.reset(r1()).await.unwrap();
    handle.get_room(r1()).await.unwrap();
    assert!(drain(&mut rx_b).is_empty(), "rejected joiner must not be subscribed");
}

#[tokio::test]
async fn test_member_rejoining_full_room_keeps_subscription() {
    let config = RoomConfig {
        max_participants: 2,
        ..RoomConfig::default()
    };
    let handle = spawn_coordinator(config, DEFAULT_CHANNEL_SIZE);
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx_a.clone()).await.unwrap();
    handle.join(r1(), pid("b"), "B".into(), tx_b).await.unwrap();

    let err = handle.join(r1(), pid("a"), "A".into(), tx_a).await.unwrap_err();
    assert!(matches!(err, RoomError::RoomFull { capacity: 2, .. }));
    let room = handle.get_room(r1()).await.unwrap().unwrap();
    assert!(room.contains(&pid("a")));
    drain(&mut rx_a);

    handle.reset(r1()).await.unwrap();
    handle.get_room(r1()).await.unwrap();
    let names: Vec<_> = drain(&mut rx_a).iter().map(|e| e.name()).collect();
    assert_eq!(names, ["vote_reset", "room_update"]);
}

#[tokio::test]
async fn test_leaver_stops_receiving() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx_a).await.unwrap();
    handle.join(r1(), pid("b"), "B".into(), tx_b).await.unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);

    handle.leave(r1(), pid("b")).await.unwrap();

    assert!(drain(&mut rx_b).is_empty());
    let ServerEvent::RoomUpdate(view) = drain(&mut rx_a).pop().unwrap() else {
        panic!("expected room_update");
    };
    assert_eq!(view.users.len(), 1);
}

#[tokio::test]
async fn test_last_leave_deletes_room() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx, _rx) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx).await.unwrap();
    assert_eq!(handle.room_count().await.unwrap(), 1);

    handle.leave(r1(), pid("a")).await.unwrap();
    assert!(handle.get_room(r1()).await.unwrap().is_none());
    assert_eq!(handle.room_count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timer_expiry_reveals_with_coffee() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx).await.unwrap();
    handle.start_timer(r1(), 30).await.unwrap();
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(31)).await;

    let names: Vec<_> = drain(&mut rx).iter().map(ServerEvent::name).collect();
    assert_eq!(names, vec!["vote_reveal", "room_update"]);
    let room = handle.get_room(r1()).await.unwrap().unwrap();
    assert!(room.revealed());
    assert_eq!(room.users()[0].vote, Some(VoteValue::Coffee));
}

#[tokio::test(start_paused = true)]
async fn test_stopped_timer_never_fires() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx).await.unwrap();
    handle.start_timer(r1(), 5).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.stop_timer(r1()).await.unwrap();
    handle.get_room(r1()).await.unwrap();
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(drain(&mut rx).is_empty());
    let room = handle.get_room(r1()).await.unwrap().unwrap();
    assert!(!room.revealed());
}

#[tokio::test(start_paused = true)]
async fn test_restarted_timer_fires_once() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.join(r1(), pid("a"), "A".into(), tx).await.unwrap();
    handle.start_timer(r1(), 0).await.unwrap();
    handle.start_timer(r1(), 10).await.unwrap();
    handle.get_room(r1()).await.unwrap();
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(11)).await;

    let reveals = drain(&mut rx)
        .iter()
        .filter(|e| e.name() == "vote_reveal")
        .count();
    assert_eq!(reveals, 1);
}

#[tokio::test]
async fn test_shutdown_makes_handle_unavailable() {
    let handle = spawn_coordinator(RoomConfig::default(), DEFAULT_CHANNEL_SIZE);
    handle.shutdown().await.unwrap();
    // Give the actor a moment to exit.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = handle.join(r1(), pid("a"), "A".into(), tx).await;
    assert_eq!(result, Err(RoomError::Unavailable));
}
