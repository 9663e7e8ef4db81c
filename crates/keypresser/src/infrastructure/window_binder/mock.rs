//! Recording window binder for tests.
//!
//! No OS calls are made.  Each request is appended to `calls` so tests can
//! assert exactly what the scheduler asked for and in which order.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{InputAttachment, WindowBinder, WindowBinding, WindowHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCall {
    Restore(WindowHandle),
    SetTopmost(WindowHandle, bool),
    Attach(InputAttachment),
    Detach(InputAttachment),
    Flush(WindowHandle),
}

/// Each attach gets a fresh `attached_thread` id (1, 2, ...) so tests can
/// tell attaches apart and match every detach to its attach.
#[derive(Debug, Default)]
pub struct MockWindowBinder {
    pub binding: Arc<WindowBinding>,
    pub calls: Mutex<Vec<WindowCall>>,
    attaches: Mutex<u32>,
}

impl MockWindowBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A binder already bound to `hwnd`.
    pub fn bound_to(hwnd: WindowHandle) -> Self {
        let binder = Self::new();
        binder.binding.set(Some(hwnd));
        binder
    }

    pub fn bind(&self, hwnd: Option<WindowHandle>) {
        self.binding.set(hwnd);
    }

    pub fn calls(&self) -> Vec<WindowCall> {
        self.calls.lock().clone()
    }

    /// Attaches that no later detach has undone.
    pub fn open_attachments(&self) -> Vec<InputAttachment> {
        let mut open = Vec::new();
        for call in self.calls() {
            match call {
                WindowCall::Attach(a) => open.push(a),
                WindowCall::Detach(a) => open.retain(|o| *o != a),
                _ => {}
            }
        }
        open
    }

    fn record(&self, call: WindowCall) {
        self.calls.lock().push(call);
    }
}

impl WindowBinder for MockWindowBinder {
    fn bound_window(&self) -> Option<WindowHandle> {
        self.binding.get()
    }

    fn restore_if_minimized(&self, hwnd: WindowHandle) {
        self.record(WindowCall::Restore(hwnd));
    }

    fn set_topmost(&self, hwnd: WindowHandle, topmost: bool) {
        self.record(WindowCall::SetTopmost(hwnd, topmost));
    }

    fn attach_input(&self, hwnd: WindowHandle) -> Option<InputAttachment> {
        let attached_thread = {
            let mut n = self.attaches.lock();
            *n += 1;
            *n
        };
        let attachment = InputAttachment {
            hwnd,
            attached_thread,
            target_thread: hwnd.0 as u32,
        };
        self.record(WindowCall::Attach(attachment));
        Some(attachment)
    }

    fn detach_input(&self, attachment: InputAttachment) {
        self.record(WindowCall::Detach(attachment));
    }

    fn flush_queued_input(&self, hwnd: WindowHandle) {
        self.record(WindowCall::Flush(hwnd));
    }
}
