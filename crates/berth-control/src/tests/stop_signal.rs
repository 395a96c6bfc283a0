use crate::{StopGuard, StopSignal};

use tokio::time::{Duration, sleep, timeout};

#[tokio::test]
async fn given_signal_when_triggered_then_guard_notified() {
    let signal = StopSignal::new();
    let mut guard = StopGuard::new(&signal);

    let trigger = signal.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        trigger.trigger();
    });

    let result = timeout(Duration::from_millis(100), guard.wait()).await;
    assert!(result.is_ok(), "stop signal should be received");
}

#[tokio::test]
async fn given_multiple_guards_when_triggered_then_all_notified() {
    let signal = StopSignal::new();
    let mut guard1 = signal.guard();
    let mut guard2 = signal.guard();

    signal.trigger();

    let result1 = timeout(Duration::from_millis(10), guard1.wait()).await;
    let result2 = timeout(Duration::from_millis(10), guard2.wait()).await;

    assert!(result1.is_ok());
    assert!(result2.is_ok());
}

#[tokio::test]
async fn given_triggered_signal_when_guard_created_late_then_wait_returns_immediately() {
    let signal = StopSignal::new();
    signal.trigger();

    let mut late = signal.guard();
    let result = timeout(Duration::from_millis(10), late.wait()).await;

    assert!(result.is_ok(), "a fired signal must stay observable");
}

#[tokio::test]
async fn given_signal_when_triggered_twice_then_idempotent() {
    let signal = StopSignal::new();

    signal.trigger();
    signal.trigger();

    assert!(signal.is_triggered());
}

#[test]
fn given_new_signal_when_polled_then_not_stopped() {
    let signal = StopSignal::new();
    let guard = signal.guard();

    assert!(!signal.is_triggered());
    assert!(!guard.poll_stopped());
}
