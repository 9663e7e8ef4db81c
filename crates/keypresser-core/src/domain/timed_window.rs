//! Wall-clock window that starts and stops the scheduler automatically.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What the timed-window poller should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    None,
    Start,
    Stop,
}

/// A local-time `[start, end)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedWindow {
    pub enabled: bool,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimedWindow {
    /// `true` when `start <= now < end`.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now < self.end
    }

    /// Decides the transition for one poll.
    ///
    /// A disabled window still evaluates its range but never asks for a
    /// transition.  A start is only requested when a target window is bound.
    pub fn evaluate(&self, now: NaiveDateTime, running: bool, has_window: bool) -> TimedAction {
        let inside = self.contains(now);
        if !self.enabled {
            return TimedAction::None;
        }
        match (inside, running) {
            (true, false) if has_window => TimedAction::Start,
            (false, true) => TimedAction::Stop,
            _ => TimedAction::None,
        }
    }
}
