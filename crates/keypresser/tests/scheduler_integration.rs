//! Integration tests for the scheduling pipeline.
//!
//! These tests run `Scheduler` + `InputDriver` end-to-end against the
//! recording transport and window binder, on real time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use keypresser::application::{InputDriver, Scheduler, SchedulerConfig};
use keypresser::infrastructure::device_locator::PortLocator;
use keypresser::infrastructure::serial::mock::MockTransport;
use keypresser::infrastructure::window_binder::mock::MockWindowBinder;
use keypresser::infrastructure::window_binder::WindowHandle;
use keypresser_core::{EmitterTable, IntervalRange, TriggerMode};

struct NoLocator;

impl PortLocator for NoLocator {
    fn find_port(&self) -> Option<String> {
        None
    }
}

fn build(
    table: EmitterTable,
    mode: TriggerMode,
    press_duration: Duration,
) -> (Scheduler, MockTransport) {
    let wire = MockTransport::opened("COM4");
    let driver = Arc::new(InputDriver::new(
        Box::new(wire.clone()),
        Arc::new(NoLocator),
    ));
    let binder = Arc::new(MockWindowBinder::bound_to(WindowHandle(0x99)));
    let scheduler = Scheduler::new(
        driver,
        binder,
        table,
        SchedulerConfig {
            mode,
            keep_topmost: false,
            press_duration,
        },
    );
    (scheduler, wire)
}

fn presses(wire: &MockTransport) -> Vec<String> {
    wire
        .frames()
        .into_iter()
        .filter(|f| f.starts_with("<0,"))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_500ms_emitter_fires_twice_within_1050ms() {
    // Arrange: F1 every 500 ms, default 100 ms hold.
    let mut table = EmitterTable::default();
    table.slots[0].enabled = true;
    table.slots[0].interval = IntervalRange::fixed(500);
    let (scheduler, wire) = build(table, TriggerMode::Independent, Duration::from_millis(100));

    // Act
    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(1050)).await;
    scheduler.stop().await;

    // Assert
    assert_eq!(presses(&wire), vec!["<0,58>", "<0,58>"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sequential_mode_rotates_in_slot_order() {
    // Arrange: A, B, C with different ranges.
    let mut table = EmitterTable::default();
    for (slot, ms) in [(12, 5), (13, 15), (14, 10)] {
        table.slots[slot].enabled = true;
        table.slots[slot].interval = IntervalRange::new(ms, ms + 5);
    }
    let (scheduler, wire) = build(table, TriggerMode::Sequential, Duration::ZERO);

    // Act
    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(400)).await;
    scheduler.stop().await;

    // Assert
    let fired = presses(&wire);
    assert!(fired.len() >= 6, "expected at least two rotations, got {fired:?}");
    let expected = ["<0,65>", "<0,66>", "<0,67>"];
    for (i, frame) in fired.iter().enumerate() {
        assert_eq!(frame, expected[i % 3], "out of order at {i}: {fired:?}");
    }
}

/// Presses with their write time, relative to `origin`.
fn timed_presses(wire: &MockTransport, origin: Instant) -> Vec<(String, Duration)> {
    wire
        .frames()
        .into_iter()
        .zip(wire.write_times())
        .filter(|(f, _)| f.starts_with("<0,"))
        .map(|(f, at)| (f, at.saturating_duration_since(origin)))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sequential_wait_comes_from_the_key_about_to_fire() {
    // Arrange: A waits 300 ms, B waits 10 ms.
    let mut table = EmitterTable::default();
    table.slots[12].enabled = true;
    table.slots[12].interval = IntervalRange::fixed(300);
    table.slots[13].enabled = true;
    table.slots[13].interval = IntervalRange::fixed(10);
    let (scheduler, wire) = build(table, TriggerMode::Sequential, Duration::ZERO);

    // Act
    let origin = Instant::now();
    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(150)).await;
    let early = wire.write_count();
    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.stop().await;

    // Assert
    assert_eq!(early, 0, "sequential mode must not fire at start");
    let fired = timed_presses(&wire, origin);
    assert_eq!(fired.len(), 2, "expected A then B, got {fired:?}");
    let (a, a_at) = &fired[0];
    let (b, b_at) = &fired[1];
    assert_eq!((a.as_str(), b.as_str()), ("<0,65>", "<0,66>"));
    assert!(
        *a_at >= Duration::from_millis(290),
        "A waits its own 300 ms first, fired at {a_at:?}"
    );
    let gap = b_at.saturating_sub(*a_at);
    assert!(
        gap >= Duration::from_millis(8) && gap < Duration::from_millis(150),
        "B waits its own 10 ms after A, gap was {gap:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_writes_after_stop_returns() {
    // Arrange: every emitter enabled on a very short interval.
    let mut table = EmitterTable::default();
    for slot in table.slots.iter_mut() {
        slot.enabled = true;
        slot.interval = IntervalRange::new(1, 3);
    }
    table.space.enabled = true;
    table.space.interval = IntervalRange::new(1, 3);
    let (scheduler, wire) = build(table, TriggerMode::Independent, Duration::from_millis(2));

    // Act
    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.stop().await;
    let stopped_at = Instant::now();
    let count_at_stop = wire.write_count();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Assert
    assert!(count_at_stop > 0);
    assert_eq!(wire.write_count(), count_at_stop);
    assert!(wire.write_times().iter().all(|t| *t <= stopped_at));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_press_is_followed_by_its_release() {
    let mut table = EmitterTable::default();
    table.slots[0].enabled = true;
    table.slots[1].enabled = true;
    table.slots[0].interval = IntervalRange::fixed(15);
    table.slots[1].interval = IntervalRange::fixed(20);
    let (scheduler, wire) = build(table, TriggerMode::Independent, Duration::from_millis(5));

    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.stop().await;

    let frames = wire.frames();
    for key in ["58", "59"] {
        let down = frames.iter().filter(|f| **f == format!("<0,{key}>")).count();
        let up = frames.iter().filter(|f| **f == format!("<1,{key}>")).count();
        assert!(down > 1, "key {key} should fire repeatedly");
        assert_eq!(down, up, "key {key} left pressed");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restart_after_stop_fires_again() {
    let mut table = EmitterTable::default();
    table.slots[2].enabled = true;
    table.slots[2].interval = IntervalRange::fixed(10_000);
    let (scheduler, wire) = build(table, TriggerMode::Independent, Duration::ZERO);

    scheduler.start().await.expect("start");
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.stop().await;
    scheduler.start().await.expect("restart");
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.stop().await;

    assert_eq!(presses(&wire), vec!["<0,60>", "<0,60>"]);
}
