//! Window binder for platforms without window control.
//!
//! Holds the binding so the scheduler can start, and ignores every window
//! request.  Nothing is recorded, so a long run keeps a flat footprint.

use std::sync::Arc;

use tracing::trace;

use super::{InputAttachment, WindowBinder, WindowBinding, WindowHandle};

#[derive(Debug, Default)]
pub struct HeadlessWindowBinder {
    binding: Arc<WindowBinding>,
}

impl HeadlessWindowBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A binder already bound to a placeholder handle.
    pub fn bound_to(hwnd: WindowHandle) -> Self {
        let binder = Self::new();
        binder.binding.set(Some(hwnd));
        binder
    }

    pub fn bind(&self, hwnd: Option<WindowHandle>) {
        self.binding.set(hwnd);
    }
}

impl WindowBinder for HeadlessWindowBinder {
    fn bound_window(&self) -> Option<WindowHandle> {
        self.binding.get()
    }

    fn restore_if_minimized(&self, _hwnd: WindowHandle) {}

    fn set_topmost(&self, hwnd: WindowHandle, topmost: bool) {
        trace!(?hwnd, topmost, "topmost ignored without window control");
    }

    /// Nothing to attach to, so there is never anything to undo.
    fn attach_input(&self, _hwnd: WindowHandle) -> Option<InputAttachment> {
        None
    }

    fn detach_input(&self, _attachment: InputAttachment) {}

    fn flush_queued_input(&self, _hwnd: WindowHandle) {}
}
