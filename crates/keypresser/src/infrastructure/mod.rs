//! Infrastructure layer: OS-facing adapters.
//!
//! **Dependency rule**: this layer may depend on `keypresser_core`, and the
//! application layer depends on the traits defined here.
//!
//! - **`serial`** – the byte-level [`serial::Transport`] and its
//!   `serialport`-backed implementation.
//! - **`device_locator`** – two-phase discovery of the Leonardo's port.
//! - **`window_binder`** – the target-window boundary (Win32 or recording).
//! - **`storage`** – TOML settings persistence.
//! - **`hotkey`** – start/stop hotkey watcher thread.

pub mod device_locator;
pub mod hotkey;
pub mod serial;
pub mod storage;
pub mod window_binder;
