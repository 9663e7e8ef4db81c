//! Modifier presets offered for each key slot.
//!
//! A preset expands to an ordered list of Arduino modifier codes.  The key
//! combination frame is the preset codes followed by the slot's key code.

use std::fmt;
use std::str::FromStr;

use super::arduino::{KEY_LEFT_ALT, KEY_LEFT_CTRL, KEY_LEFT_GUI, KEY_LEFT_SHIFT};
use super::{normalise, KeymapError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierPreset {
    #[default]
    None,
    Shift,
    Ctrl,
    Alt,
    Win,
    ShiftCtrl,
    ShiftAlt,
    CtrlAlt,
    CtrlWin,
    AltWin,
    ShiftWin,
}

impl ModifierPreset {
    /// All presets in display order.
    pub const ALL: [ModifierPreset; 11] = [
        ModifierPreset::None,
        ModifierPreset::Shift,
        ModifierPreset::Ctrl,
        ModifierPreset::Alt,
        ModifierPreset::Win,
        ModifierPreset::ShiftCtrl,
        ModifierPreset::ShiftAlt,
        ModifierPreset::CtrlAlt,
        ModifierPreset::CtrlWin,
        ModifierPreset::AltWin,
        ModifierPreset::ShiftWin,
    ];

    /// Modifier codes pressed ahead of the key, in order.
    pub fn codes(self) -> &'static [u16] {
        match self {
            ModifierPreset::None => &[],
            ModifierPreset::Shift => &[KEY_LEFT_SHIFT],
            ModifierPreset::Ctrl => &[KEY_LEFT_CTRL],
            ModifierPreset::Alt => &[KEY_LEFT_ALT],
            ModifierPreset::Win => &[KEY_LEFT_GUI],
            ModifierPreset::ShiftCtrl => &[KEY_LEFT_SHIFT, KEY_LEFT_CTRL],
            ModifierPreset::ShiftAlt => &[KEY_LEFT_SHIFT, KEY_LEFT_ALT],
            ModifierPreset::CtrlAlt => &[KEY_LEFT_CTRL, KEY_LEFT_ALT],
            ModifierPreset::CtrlWin => &[KEY_LEFT_CTRL, KEY_LEFT_GUI],
            ModifierPreset::AltWin => &[KEY_LEFT_ALT, KEY_LEFT_GUI],
            ModifierPreset::ShiftWin => &[KEY_LEFT_SHIFT, KEY_LEFT_GUI],
        }
    }

    /// Human-readable label; the empty string for [`ModifierPreset::None`].
    pub fn label(self) -> &'static str {
        match self {
            ModifierPreset::None => "",
            ModifierPreset::Shift => "Shift",
            ModifierPreset::Ctrl => "Ctrl",
            ModifierPreset::Alt => "Alt",
            ModifierPreset::Win => "Win",
            ModifierPreset::ShiftCtrl => "Shift+Ctrl",
            ModifierPreset::ShiftAlt => "Shift+Alt",
            ModifierPreset::CtrlAlt => "Ctrl+Alt",
            ModifierPreset::CtrlWin => "Ctrl+Win",
            ModifierPreset::AltWin => "Alt+Win",
            ModifierPreset::ShiftWin => "Shift+Win",
        }
    }
}

impl fmt::Display for ModifierPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModifierPreset {
    type Err = KeymapError;

    /// Parses a label such as `"Ctrl+Alt"`.  `""` and `"none"` give
    /// [`ModifierPreset::None`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalise(s);
        if wanted.is_empty() || wanted == "none" {
            return Ok(ModifierPreset::None);
        }
        ModifierPreset::ALL
            .into_iter()
            .find(|preset| normalise(preset.label()) == wanted)
            .ok_or_else(|| KeymapError::UnknownModifier(s.to_string()))
    }
}
