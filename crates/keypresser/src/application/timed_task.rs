//! Timed automation: a once-a-second check of the wall clock against the
//! configured window.
//!
//! The poller runs for the life of the process whether or not automation is
//! enabled.  It is the only component that starts or stops the scheduler on
//! its own.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use keypresser_core::{TimedAction, TimedWindow};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::scheduler::Scheduler;

/// Poll period.
pub const POLL_PERIOD: Duration = Duration::from_secs(1);

pub struct TimedTaskPoller {
    scheduler: Arc<Scheduler>,
    window: RwLock<Option<TimedWindow>>,
}

impl TimedTaskPoller {
    pub fn new(scheduler: Arc<Scheduler>, window: Option<TimedWindow>) -> Self {
        Self {
            scheduler,
            window: RwLock::new(window),
        }
    }

    /// Replaces the window; `None` disables automation.
    pub fn set_window(&self, window: Option<TimedWindow>) {
        *self.window.write() = window;
    }

    /// One poll at `now`.  Returns the action that was taken.
    pub async fn tick_at(&self, now: NaiveDateTime) -> TimedAction {
        let Some(window) = *self.window.read() else {
            return TimedAction::None;
        };

        let action = window.evaluate(
            now,
            self.scheduler.is_running(),
            self.scheduler.has_target_window(),
        );
        match action {
            TimedAction::Start => {
                info!(%now, "timed window opened, starting");
                if let Err(e) = self.scheduler.start().await {
                    warn!(error = %e, "timed start rejected");
                }
            }
            TimedAction::Stop => {
                info!(%now, "outside timed window, stopping");
                self.scheduler.stop().await;
            }
            TimedAction::None => {}
        }
        action
    }

    /// Spawns the 1 s polling loop against local time.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_PERIOD);
            loop {
                ticker.tick().await;
                self.tick_at(Local::now().naive_local()).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::input_driver::InputDriver;
    use crate::application::scheduler::SchedulerConfig;
    use crate::infrastructure::device_locator::PortLocator;
    use crate::infrastructure::serial::mock::MockTransport;
    use crate::infrastructure::window_binder::mock::MockWindowBinder;
    use crate::infrastructure::window_binder::WindowHandle;
    use chrono::NaiveDate;
    use keypresser_core::EmitterTable;

    struct NoLocator;

    impl PortLocator for NoLocator {
        fn find_port(&self) -> Option<String> {
            None
        }
    }

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .expect("valid time")
    }

    fn poller(enabled: bool, bound: bool) -> (TimedTaskPoller, Arc<Scheduler>) {
        let driver = Arc::new(InputDriver::new(
            Box::new(MockTransport::opened("COM3")),
            Arc::new(NoLocator),
        ));
        let binder = if bound {
            MockWindowBinder::bound_to(WindowHandle(7))
        } else {
            MockWindowBinder::new()
        };
        let scheduler = Arc::new(Scheduler::new(
            driver,
            Arc::new(binder),
            EmitterTable::default(),
            SchedulerConfig::default(),
        ));
        let window = TimedWindow {
            enabled,
            start: at(9),
            end: at(17),
        };
        (
            TimedTaskPoller::new(Arc::clone(&scheduler), Some(window)),
            scheduler,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_inside_window_starts_and_outside_stops() {
        // Arrange
        let (poller, scheduler) = poller(true, true);

        // Act / Assert
        assert_eq!(poller.tick_at(at(10)).await, TimedAction::Start);
        assert!(scheduler.is_running());
        assert_eq!(poller.tick_at(at(11)).await, TimedAction::None);
        assert_eq!(poller.tick_at(at(17)).await, TimedAction::Stop);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_disabled_window_takes_no_action() {
        let (poller, scheduler) = poller(false, true);

        assert_eq!(poller.tick_at(at(10)).await, TimedAction::None);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_bound_window_never_starts() {
        let (poller, scheduler) = poller(true, false);

        assert_eq!(poller.tick_at(at(10)).await, TimedAction::None);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cleared_window_takes_no_action() {
        let (poller, scheduler) = poller(true, true);
        poller.set_window(None);

        assert_eq!(poller.tick_at(at(10)).await, TimedAction::None);
        assert!(!scheduler.is_running());
    }
}
