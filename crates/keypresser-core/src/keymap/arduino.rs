//! Named Arduino key codes understood by the firmware.

use super::normalise;

pub const KEY_LEFT_CTRL: u16 = 128;
pub const KEY_LEFT_SHIFT: u16 = 129;
pub const KEY_LEFT_ALT: u16 = 130;
pub const KEY_LEFT_GUI: u16 = 131;
pub const KEY_RIGHT_GUI: u16 = 135;

/// Code sent by the dedicated space emitter.
pub const KEY_SPACE: u16 = 0x20;

pub const KEY_F1: u16 = 0x3A;

/// One entry of the key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedKey {
    pub name: &'static str,
    pub code: u16,
}

const fn k(name: &'static str, code: u16) -> NamedKey {
    NamedKey { name, code }
}

/// Every selectable key, in the order a configuration surface lists them.
pub const NAMED_KEYS: &[NamedKey] = &[
    k("F1", 0x3A),
    k("F2", 0x3B),
    k("F3", 0x3C),
    k("F4", 0x3D),
    k("F5", 0x3E),
    k("F6", 0x3F),
    k("F7", 0x40),
    k("F8", 0x41),
    k("F9", 0x42),
    k("F10", 0x43),
    k("F11", 0x44),
    k("F12", 0x45),
    k("A", b'A' as u16),
    k("B", b'B' as u16),
    k("C", b'C' as u16),
    k("D", b'D' as u16),
    k("E", b'E' as u16),
    k("F", b'F' as u16),
    k("G", b'G' as u16),
    k("H", b'H' as u16),
    k("I", b'I' as u16),
    k("J", b'J' as u16),
    k("K", b'K' as u16),
    k("L", b'L' as u16),
    k("M", b'M' as u16),
    k("N", b'N' as u16),
    k("O", b'O' as u16),
    k("P", b'P' as u16),
    k("Q", b'Q' as u16),
    k("R", b'R' as u16),
    k("S", b'S' as u16),
    k("T", b'T' as u16),
    k("U", b'U' as u16),
    k("V", b'V' as u16),
    k("W", b'W' as u16),
    k("X", b'X' as u16),
    k("Y", b'Y' as u16),
    k("Z", b'Z' as u16),
    k("0", b'0' as u16),
    k("1", b'1' as u16),
    k("2", b'2' as u16),
    k("3", b'3' as u16),
    k("4", b'4' as u16),
    k("5", b'5' as u16),
    k("6", b'6' as u16),
    k("7", b'7' as u16),
    k("8", b'8' as u16),
    k("9", b'9' as u16),
    k("Shift", KEY_LEFT_SHIFT),
    k("Space", KEY_SPACE),
    k("Enter", 0x28),
    k("Tab", 0x2B),
    k("Esc", 0x29),
    k("Backspace", 0x2A),
    k("Insert", 0x49),
    k("Delete", 0x4C),
    k("Home", 0x4A),
    k("End", 0x4D),
    k("Page Up", 0x4B),
    k("Page Down", 0x4E),
    k("Left Arrow", 0x50),
    k("Right Arrow", 0x4F),
    k("Up Arrow", 0x52),
    k("Down Arrow", 0x51),
];

/// Looks up a key code by name, ignoring case, spaces, `_` and `-`.
///
/// # Examples
///
/// ```rust
/// use keypresser_core::keymap::key_code;
///
/// assert_eq!(key_code("f1"), Some(0x3A));
/// assert_eq!(key_code("page_up"), Some(0x4B));
/// assert_eq!(key_code("nope"), None);
/// ```
pub fn key_code(name: &str) -> Option<u16> {
    let wanted = normalise(name);
    NAMED_KEYS
        .iter()
        .find(|key| normalise(key.name) == wanted)
        .map(|key| key.code)
}

/// Returns the display name for a key code, if it is in the table.
pub fn key_name(code: u16) -> Option<&'static str> {
    NAMED_KEYS.iter().find(|key| key.code == code).map(|key| key.name)
}
