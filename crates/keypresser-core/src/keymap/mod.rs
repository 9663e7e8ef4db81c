//! Key code tables.
//!
//! The firmware expects Arduino key codes: printable keys use their ASCII
//! value, modifiers use the Arduino `KEY_LEFT_*` range (128..=135), and the
//! function and navigation keys use USB HID usage ids.  Trigger hotkeys are
//! watched on the host side, so they use Windows virtual-key codes instead.

pub mod arduino;
pub mod modifiers;
pub mod windows_vk;

use thiserror::Error;

pub use arduino::{key_code, key_name, NamedKey, NAMED_KEYS};
pub use modifiers::ModifierPreset;
pub use windows_vk::{trigger_vk, TRIGGER_HOTKEYS};

/// Errors raised when a key, modifier preset, or hotkey name is not in a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    #[error("unknown key name: {0:?}")]
    UnknownKey(String),

    #[error("unknown modifier preset: {0:?}")]
    UnknownModifier(String),

    #[error("unknown trigger hotkey: {0:?}")]
    UnknownHotkey(String),
}

/// Normalises a user-facing name for lookup: lowercase with spaces, `_` and
/// `-` removed, so `"Page Up"`, `"page_up"` and `"PAGEUP"` all match.
pub(crate) fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
