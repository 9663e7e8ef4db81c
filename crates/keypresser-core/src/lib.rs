//! # keypresser-core
//!
//! Shared library for the Arduino key presser: the firmware command codec,
//! key-code tables, and the scheduling domain types.
//!
//! It has no dependencies on OS APIs or serial ports.  The `keypresser`
//! crate wires these types to real hardware.
//!
//! - **`protocol`** – [`Command`] values and the `<type,arg,...>` ASCII frame
//!   codec.
//! - **`keymap`** – Arduino key codes, modifier presets, and the Windows VK
//!   codes used for the trigger hotkey.
//! - **`domain`** – emitter configuration, randomised intervals, the run state,
//!   the sequential cursor, and the timed automation window.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::{
    EmitterConfig, EmitterTable, IntervalRange, KeyStroke, RunState, SequenceCursor, TimedAction,
    TimedWindow, TriggerMode, SLOT_COUNT,
};
pub use keymap::{KeymapError, ModifierPreset};
pub use protocol::{decode_frame, encode_command, Command, MouseButtons, ProtocolError};
