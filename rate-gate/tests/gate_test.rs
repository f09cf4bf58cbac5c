// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Admission, waiting and cancellation behaviour of the rate gate.
//!
//! Most tests run on a paused clock so window boundaries are exact.

mod harness;

use harness::timeline::{spawn_callers, Timeline};
use rate_gate::{GateError, RateGate};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

const SECOND: Duration = Duration::from_secs(1);

#[test]
fn test_invalid_config_rejected() {
    assert!(matches!(
        RateGate::new(0, Duration::from_secs(60)),
        Err(GateError::InvalidConfig(_))
    ));
    assert!(matches!(
        RateGate::new(5, Duration::ZERO),
        Err(GateError::InvalidConfig(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_caller_past_limit_waits_for_rest_of_window() {
    let gate = RateGate::new(3, Duration::from_secs(10)).unwrap();
    let t0 = Instant::now();

    for _ in 0..3 {
        gate.acquire().await;
    }
    assert_eq!(Instant::now(), t0, "first {} callers must not wait", gate.limit());

    tokio::time::advance(Duration::from_secs(4)).await;
    gate.acquire().await;
    assert_eq!(Instant::now(), t0 + Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_six_calls_at_five_per_minute() {
    let gate = RateGate::new(5, Duration::from_secs(60)).unwrap();
    let t0 = Instant::now();

    for i in 0..5 {
        gate.acquire().await;
        assert_eq!(Instant::now(), t0, "call {} should be immediate", i + 1);
    }

    gate.acquire().await;
    assert_eq!(Instant::now(), t0 + Duration::from_secs(60));

    // The sixth call opened a new window and holds one of its five slots.
    for _ in 0..4 {
        assert!(gate.try_acquire().await);
    }
    assert!(!gate.try_acquire().await);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_burst_admits_limit_then_rest_next_window() {
    let gate = RateGate::new(5, SECOND).unwrap();
    let timeline = Timeline::new();
    let t0 = Instant::now();

    for handle in spawn_callers(&gate, &timeline, 8) {
        handle.await.unwrap();
    }

    assert_eq!(timeline.len(), 8);
    assert_eq!(timeline.admitted_at(t0), vec![0, 1, 2, 3, 4]);
    assert_eq!(timeline.admitted_at(t0 + SECOND), vec![5, 6, 7]);
}

#[tokio::test(start_paused = true)]
async fn test_never_more_than_limit_in_any_window() {
    let gate = RateGate::new(4, SECOND).unwrap();
    let timeline = Timeline::new();
    let t0 = Instant::now();

    for handle in spawn_callers(&gate, &timeline, 20) {
        handle.await.unwrap();
    }

    assert_eq!(timeline.len(), 20);
    assert_eq!(timeline.max_in_any_window(SECOND), 4);

    let admissions = timeline.admissions();
    assert_eq!(admissions.last().unwrap().1, t0 + SECOND * 4);

    // Waiters are served in arrival order.
    let order: Vec<usize> = admissions.iter().map(|(id, _)| *id).collect();
    assert_eq!(order, (0..20).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_signal_takes_no_slot() {
    let gate = RateGate::new(2, SECOND).unwrap();

    gate.acquire().await;
    assert_eq!(
        gate.acquire_with(std::future::ready(())).await,
        Err(GateError::Cancelled)
    );

    // Exactly one slot is still free.
    assert!(gate.try_acquire().await);
    assert!(!gate.try_acquire().await);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_while_suspended_is_cancelled() {
    let gate = RateGate::new(2, SECOND).unwrap();
    let t0 = Instant::now();

    gate.acquire().await;
    gate.acquire().await;

    let result = gate.acquire_timeout(Duration::from_millis(200)).await;
    assert_eq!(result, Err(GateError::Cancelled));
    assert_eq!(Instant::now(), t0 + Duration::from_millis(200));

    // Next window behaves as if the timed-out caller never asked.
    tokio::time::advance(Duration::from_millis(800)).await;
    assert!(gate.try_acquire().await);
    assert!(gate.try_acquire().await);
    assert!(!gate.try_acquire().await);
}

#[tokio::test(start_paused = true)]
async fn test_acquire_timeout_succeeds_when_slot_frees_in_time() {
    let gate = RateGate::new(1, SECOND).unwrap();
    let t0 = Instant::now();

    gate.acquire().await;
    assert_eq!(gate.acquire_timeout(SECOND * 2).await, Ok(()));
    assert_eq!(Instant::now(), t0 + SECOND);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_waiter_hands_queue_to_next() {
    let gate = RateGate::new(1, Duration::from_secs(10)).unwrap();
    let t0 = Instant::now();
    gate.acquire().await;

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let head = {
        let gate = gate.clone();
        tokio::spawn(async move {
            gate.acquire_with(async {
                let _ = cancel_rx.await;
            })
            .await
        })
    };
    let next = {
        let gate = gate.clone();
        tokio::spawn(async move {
            gate.acquire().await;
            Instant::now()
        })
    };

    tokio::time::sleep(SECOND).await;
    cancel_tx.send(()).unwrap();

    assert_eq!(head.await.unwrap(), Err(GateError::Cancelled));
    assert_eq!(next.await.unwrap(), t0 + Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_try_acquire_does_not_jump_queue() {
    let gate = RateGate::new(1, SECOND).unwrap();
    gate.acquire().await;

    let waiter = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.acquire().await })
    };
    tokio::task::yield_now().await;

    // The queued waiter owns the next slot even once the window has rolled.
    tokio::time::advance(SECOND).await;
    assert!(!gate.try_acquire().await);
    waiter.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_window() {
    let gate = RateGate::new(2, SECOND).unwrap();
    let other = gate.clone();

    gate.acquire().await;
    other.acquire().await;
    assert!(!gate.try_acquire().await);
    assert!(!other.try_acquire().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_multi_thread_callers_never_exceed_limit_per_window() {
    // Admission instants are recorded after `acquire` returns, so the window
    // is kept long relative to scheduling jitter.
    let window = Duration::from_millis(200);

    for round in 0..5 {
        let gate = RateGate::new(4, window).unwrap();
        let timeline = Timeline::new();
        let start = std::time::Instant::now();

        for handle in spawn_callers(&gate, &timeline, 12) {
            handle.await.unwrap();
        }

        assert_eq!(timeline.len(), 12, "round {round}");
        assert!(
            timeline.max_in_any_window(window) <= 4,
            "round {round}: more than 4 admissions inside one window"
        );
        assert!(
            start.elapsed() >= window * 2,
            "round {round}: 12 callers at 4 per window need at least three windows"
        );
    }
}
