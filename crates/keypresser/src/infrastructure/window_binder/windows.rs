//! Win32 window binder.
//!
//! Binds the foreground window on request and performs the restore, topmost,
//! thread-input attach, and message-flush operations through `user32`.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::sync::Arc;

use tracing::{debug, warn};
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowThreadProcessId, IsIconic, PeekMessageW, SetWindowPos,
    ShowWindow, HWND_NOTOPMOST, HWND_TOPMOST, MSG, PM_REMOVE, SWP_NOMOVE, SWP_NOSIZE, SW_RESTORE,
    WM_KEYFIRST, WM_KEYLAST, WM_WINDOWPOSCHANGED, WM_WINDOWPOSCHANGING,
};

use super::{InputAttachment, WindowBinder, WindowBinding, WindowHandle};

/// [`WindowBinder`] backed by `user32`.
#[derive(Debug, Default)]
pub struct Win32WindowBinder {
    binding: Arc<WindowBinding>,
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

impl Win32WindowBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds whatever window currently has the foreground.
    ///
    /// Returns the bound handle, or `None` if no window is in the foreground.
    pub fn bind_foreground(&self) -> Option<WindowHandle> {
        // SAFETY: GetForegroundWindow has no preconditions.
        let fg = unsafe { GetForegroundWindow() };
        let handle = (!fg.is_invalid()).then(|| WindowHandle(fg.0 as isize));
        self.binding.set(handle);
        debug!(?handle, "bound foreground window");
        handle
    }

    /// Binds a known handle or clears the binding.
    pub fn bind(&self, handle: Option<WindowHandle>) {
        self.binding.set(handle);
    }

    fn thread_pair(&self, handle: WindowHandle) -> Option<(u32, u32)> {
        // SAFETY: GetWindowThreadProcessId tolerates stale handles and returns 0.
        let target = unsafe { GetWindowThreadProcessId(hwnd(handle), None) };
        if target == 0 {
            return None;
        }
        // SAFETY: GetCurrentThreadId has no preconditions.
        let current = unsafe { GetCurrentThreadId() };
        Some((current, target))
    }
}

impl WindowBinder for Win32WindowBinder {
    fn bound_window(&self) -> Option<WindowHandle> {
        self.binding.get()
    }

    fn restore_if_minimized(&self, handle: WindowHandle) {
        // SAFETY: both calls accept any HWND and fail harmlessly on stale ones.
        unsafe {
            if IsIconic(hwnd(handle)).as_bool() {
                let _ = ShowWindow(hwnd(handle), SW_RESTORE);
            }
        }
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        // SAFETY: SetWindowPos with NOMOVE|NOSIZE only changes z-order.
        let result = unsafe {
            SetWindowPos(hwnd(handle), insert_after, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
        };
        if let Err(e) = result {
            warn!(error = %e, topmost, "SetWindowPos failed");
        }
    }

    fn attach_input(&self, handle: WindowHandle) -> Option<InputAttachment> {
        let (current, target) = self.thread_pair(handle)?;
        // SAFETY: both ids come from the OS for live threads.
        if !unsafe { AttachThreadInput(current, target, BOOL::from(true)) }.as_bool() {
            warn!("AttachThreadInput(attach) failed");
            return None;
        }
        Some(InputAttachment {
            hwnd: handle,
            attached_thread: current,
            target_thread: target,
        })
    }

    fn detach_input(&self, attachment: InputAttachment) {
        // SAFETY: the pair was joined by attach_input; detaching by id works
        // from any thread.
        let detached = unsafe {
            AttachThreadInput(
                attachment.attached_thread,
                attachment.target_thread,
                BOOL::from(false),
            )
        };
        if !detached.as_bool() {
            warn!(?attachment, "AttachThreadInput(detach) failed");
        }
    }

    fn flush_queued_input(&self, handle: WindowHandle) {
        let mut msg = MSG::default();
        for (first, last) in [
            (WM_KEYFIRST, WM_KEYLAST),
            (WM_WINDOWPOSCHANGING, WM_WINDOWPOSCHANGED),
        ] {
            // SAFETY: `msg` is a valid out-pointer for the duration of each call.
            while unsafe { PeekMessageW(&mut msg, hwnd(handle), first, last, PM_REMOVE) }.as_bool()
            {}
        }
    }
}
