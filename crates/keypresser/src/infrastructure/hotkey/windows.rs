//! Key state from `GetAsyncKeyState`.

#![cfg(target_os = "windows")]

use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

use super::KeyStateSource;

#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncKeyState;

impl KeyStateSource for AsyncKeyState {
    fn is_down(&self, vk: u8) -> bool {
        // SAFETY: GetAsyncKeyState accepts any virtual-key value.
        let state = unsafe { GetAsyncKeyState(i32::from(vk)) };
        // The most significant bit is set while the key is held.
        state < 0
    }
}
