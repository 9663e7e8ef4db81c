//! Windows virtual-key codes for the start/stop trigger hotkey.
//!
//! The hotkey is read from the host keyboard, never sent to the firmware, so
//! it uses `VK_*` values from `winuser.h` rather than Arduino codes.

use super::normalise;

/// Selectable trigger hotkeys as `(name, VK code)`.
pub const TRIGGER_HOTKEYS: &[(&str, u8)] = &[
    ("Home", 0x24),
    ("*", 0x6A),
    ("Alt", 0xA4),
    ("Insert", 0x2D),
    ("End", 0x23),
    ("Page Up", 0x21),
    ("Page Down", 0x22),
    ("Esc", 0x1B),
    ("F1", 0x70),
    ("F2", 0x71),
    ("F3", 0x72),
    ("F4", 0x73),
    ("F5", 0x74),
    ("F6", 0x75),
    ("F7", 0x76),
    ("F8", 0x77),
    ("F9", 0x78),
    ("F10", 0x79),
    ("F11", 0x7A),
    ("F12", 0x7B),
];

/// Resolves a trigger hotkey name to its VK code.
pub fn trigger_vk(name: &str) -> Option<u8> {
    let wanted = normalise(name);
    TRIGGER_HOTKEYS
        .iter()
        .find(|(n, _)| normalise(n) == wanted)
        .map(|&(_, vk)| vk)
}
