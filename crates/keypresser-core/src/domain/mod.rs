//! Pure scheduling domain types with no I/O.

pub mod emitter;
pub mod interval;
pub mod run_state;
pub mod sequence;
pub mod timed_window;

pub use emitter::{EmitterConfig, EmitterTable, KeyStroke, SLOT_COUNT};
pub use interval::IntervalRange;
pub use run_state::{RunState, TriggerMode};
pub use sequence::SequenceCursor;
pub use timed_window::{TimedAction, TimedWindow};
