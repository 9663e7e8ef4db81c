//! Window Binder: the boundary to the externally selected target window.
//!
//! The scheduler never creates or destroys windows.  It reads the currently
//! bound handle and asks the binder to restore, raise, attach to, or detach
//! from it.  The selection itself is done by whoever owns the binder (the CLI
//! binds the foreground window), through a [`WindowBinding`] shared with it.

pub mod headless;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

use std::sync::atomic::{AtomicIsize, Ordering};

/// Opaque OS window handle.  Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// A live input attach: the thread whose queue was joined and the thread
/// owning the window.  Detaching must use the same pair, whichever thread
/// ends up doing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputAttachment {
    pub hwnd: WindowHandle,
    pub attached_thread: u32,
    pub target_thread: u32,
}

/// Window operations the scheduler needs.
///
/// Every method is best effort: failures are logged by the implementation
/// and never interrupt a tick or a stop.
pub trait WindowBinder: Send + Sync {
    /// Currently bound target, if any.
    fn bound_window(&self) -> Option<WindowHandle>;

    /// Restores `hwnd` if it is minimised.
    fn restore_if_minimized(&self, hwnd: WindowHandle);

    /// Places `hwnd` above (or releases it from above) all non-topmost windows.
    fn set_topmost(&self, hwnd: WindowHandle, topmost: bool);

    /// Joins the calling thread's input queue to the one owning `hwnd`.
    ///
    /// Returns `None` when nothing was attached.
    fn attach_input(&self, hwnd: WindowHandle) -> Option<InputAttachment>;

    /// Undoes the attach described by `attachment`.
    fn detach_input(&self, attachment: InputAttachment);

    /// Drops queued key and window-position messages addressed to `hwnd`.
    fn flush_queued_input(&self, hwnd: WindowHandle);
}

/// The bound target, shared between the selector and every reader.
///
/// Reads and writes are single atomic operations, so emitters always see a
/// whole handle or none.
#[derive(Debug, Default)]
pub struct WindowBinding(AtomicIsize);

impl WindowBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<WindowHandle> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            raw => Some(WindowHandle(raw)),
        }
    }

    /// Binds `hwnd`, or clears the binding with `None`.
    pub fn set(&self, hwnd: Option<WindowHandle>) {
        self.0.store(hwnd.map_or(0, |h| h.0), Ordering::Release);
    }
}
