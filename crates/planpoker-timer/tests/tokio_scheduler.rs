//! Integration tests for the Tokio-backed scheduler.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when every task
//! is idle; sleeps resolve instantly and deterministically.

use std::time::Duration;

use planpoker_timer::{Scheduler, TokioScheduler};

#[tokio::test(start_paused = true)]
async fn test_payload_arrives_after_delay() {
    let (mut s, mut rx) = TokioScheduler::new();
    s.schedule(Duration::from_secs(5), "expired");

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(rx.try_recv().is_err(), "must not fire early");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(rx.try_recv().unwrap(), "expired");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_deadline_prevents_delivery() {
    let (mut s, mut rx) = TokioScheduler::new();
    let handle = s.schedule(Duration::from_secs(5), 1u32);

    tokio::time::sleep(Duration::from_secs(1)).await;
    s.cancel(handle);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(s.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_independent_timers_fire_in_order() {
    let (mut s, mut rx) = TokioScheduler::new();
    s.schedule(Duration::from_secs(3), "second");
    s.schedule(Duration::from_secs(1), "first");

    assert_eq!(rx.recv().await.unwrap(), "first");
    assert_eq!(rx.recv().await.unwrap(), "second");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_fire_is_harmless() {
    let (mut s, mut rx) = TokioScheduler::new();
    let handle = s.schedule(Duration::ZERO, 7u8);
    assert_eq!(rx.recv().await.unwrap(), 7);
    s.cancel(handle);
    assert_eq!(s.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pending_counts_live_timers() {
    let (mut s, _rx) = TokioScheduler::<()>::new();
    let a = s.schedule(Duration::from_secs(10), ());
    s.schedule(Duration::from_secs(10), ());
    assert_eq!(s.pending(), 2);
    s.cancel(a);
    assert_eq!(s.pending(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_scheduler_aborts_timers() {
    let (mut s, mut rx) = TokioScheduler::new();
    s.schedule(Duration::from_secs(1), ());
    drop(s);

    tokio::time::sleep(Duration::from_secs(2)).await;
    // Sender side is gone and nothing was delivered.
    assert!(rx.recv().await.is_none());
}
