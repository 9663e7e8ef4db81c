//! keypresser library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and the
//! binary in `main.rs` share one module tree.
//!
//! # What does keypresser do?
//!
//! It presses keys on a schedule through an Arduino Leonardo acting as a USB
//! keyboard, so the target application sees genuine hardware input.
//!
//! 1. Finds the Leonardo's serial port (device metadata first, port scan second).
//! 2. Opens the port and speaks the firmware's `<type,arg,...>` frame protocol.
//! 3. Runs up to fifteen key emitters plus a space emitter, each on its own
//!    randomised interval, or rotates through them one at a time.
//! 4. Optionally keeps the selected target window restored and topmost, and
//!    starts or stops on a hotkey or a wall-clock window.

/// Application layer: input façade, scheduler, timed automation.
pub mod application;

/// Infrastructure layer: serial port, discovery, window binder, settings, hotkey.
pub mod infrastructure;
