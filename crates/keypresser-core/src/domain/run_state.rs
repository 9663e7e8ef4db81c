//! Global run/stop state and the trigger mode selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How enabled emitters are scheduled once running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Every emitter runs its own timer.
    #[default]
    Independent,
    /// One timer rotates through the enabled slots.
    Sequential,
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerMode::Independent => f.write_str("independent"),
            TriggerMode::Sequential => f.write_str("sequential"),
        }
    }
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(TriggerMode::Independent),
            "sequential" => Ok(TriggerMode::Sequential),
            other => Err(format!("unknown trigger mode: {other:?}")),
        }
    }
}

/// The single live run state.
///
/// Each start bumps `generation`; a tick compares the generation it was
/// spawned under against the live one before doing any I/O, so a tick from an
/// earlier run can never fire after a stop or restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running { mode: TriggerMode, generation: u64 },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    /// `true` if running under exactly `generation`.
    pub fn is_generation(&self, generation: u64) -> bool {
        matches!(self, RunState::Running { generation: g, .. } if *g == generation)
    }

    pub fn mode(&self) -> Option<TriggerMode> {
        match self {
            RunState::Running { mode, .. } => Some(*mode),
            RunState::Stopped => None,
        }
    }
}
