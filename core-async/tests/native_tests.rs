//! Integration tests for the runtime abstraction layer.

use core_async::sync::{oneshot, CancellationToken, Semaphore};
use core_async::time::{self, Duration, Ticker};
use core_async::{sync, task};
use std::sync::Arc;

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_elapses() {
    let result = time::timeout(Duration::from_millis(10), async {
        time::sleep(Duration::from_millis(100)).await;
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_timeout_success() {
    let (tx, rx) = oneshot::channel();
    tx.send(7).unwrap();

    let result = time::timeout(Duration::from_secs(1), rx).await;
    assert_eq!(result.unwrap().unwrap(), 7);
}

#[tokio::test]
async fn test_single_slot_semaphore_serialises() {
    let gate = Arc::new(Semaphore::new(1));
    let first = gate.clone().acquire_owned().await.unwrap();

    assert!(gate.try_acquire().is_err());
    drop(first);
    assert!(gate.try_acquire().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_ticker_fires_immediately_then_on_period() {
    let token = CancellationToken::new();
    let mut ticker = Ticker::new(Duration::from_secs(1), token.clone());
    let start = time::Instant::now();

    assert!(ticker.tick().await);
    assert_eq!(start.elapsed(), Duration::ZERO);

    assert!(ticker.tick().await);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ticker_stops_on_cancel() {
    let token = CancellationToken::new();
    let mut ticker = Ticker::new(Duration::from_secs(1), token.clone());
    assert!(ticker.tick().await);

    let canceller = token.clone();
    task::spawn(async move {
        time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    assert!(!ticker.tick().await);
    assert!(!ticker.tick().await);
}

#[tokio::test]
async fn test_watch_channel_latest_value() {
    let (tx, mut rx) = sync::watch::channel(0u32);
    tx.send(3).unwrap();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_select_prefers_cancellation() {
    let token = CancellationToken::new();
    token.cancel();

    let woke = core_async::select! {
        biased;
        _ = token.cancelled() => "cancelled",
        _ = time::sleep(Duration::from_secs(60)) => "slept",
    };
    assert_eq!(woke, "cancelled");
}
