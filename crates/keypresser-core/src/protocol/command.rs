//! Command types sent to the Arduino Leonardo firmware.
//!
//! Every command travels as one ASCII frame `<type_id,arg,...>`.  The firmware
//! acts on each frame as soon as the closing `>` arrives; nothing is ever sent
//! back, so a command is fire-and-forget.

use serde::{Deserialize, Serialize};

// ── Frame constants ───────────────────────────────────────────────────────────

/// Opening delimiter of a frame.
pub const FRAME_START: char = '<';

/// Closing delimiter of a frame.
pub const FRAME_END: char = '>';

/// Separator between the type id and each argument.
pub const ARG_SEPARATOR: char = ',';

// ── Command type ids ──────────────────────────────────────────────────────────

/// Numeric type id carried as the first field of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandType {
    PressKey = 0,
    ReleaseKey = 1,
    TypeString = 2,
    PressCombination = 3,
    Delay = 4,
    MouseMove = 5,
    MousePress = 6,
    MouseRelease = 7,
    MouseClick = 8,
    MouseWheel = 9,
}

impl TryFrom<u8> for CommandType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommandType::PressKey),
            1 => Ok(CommandType::ReleaseKey),
            2 => Ok(CommandType::TypeString),
            3 => Ok(CommandType::PressCombination),
            4 => Ok(CommandType::Delay),
            5 => Ok(CommandType::MouseMove),
            6 => Ok(CommandType::MousePress),
            7 => Ok(CommandType::MouseRelease),
            8 => Ok(CommandType::MouseClick),
            9 => Ok(CommandType::MouseWheel),
            _ => Err(()),
        }
    }
}

// ── Mouse buttons ─────────────────────────────────────────────────────────────

/// Bitmask of mouse buttons understood by the firmware.
///
/// Masks combine with `|`: `MouseButtons(MouseButtons::LEFT | MouseButtons::RIGHT)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MouseButtons(pub u8);

impl MouseButtons {
    pub const LEFT: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const MIDDLE: u8 = 4;
    pub const ALL: u8 = Self::LEFT | Self::RIGHT | Self::MIDDLE;

    /// Left button only.
    pub const fn left() -> Self {
        Self(Self::LEFT)
    }

    /// Right button only.
    pub const fn right() -> Self {
        Self(Self::RIGHT)
    }

    /// Middle button only.
    pub const fn middle() -> Self {
        Self(Self::MIDDLE)
    }

    /// All three buttons.
    pub const fn all() -> Self {
        Self(Self::ALL)
    }

    /// Returns `true` if the left bit is set.
    pub fn has_left(&self) -> bool {
        self.0 & Self::LEFT != 0
    }

    /// Returns `true` if the right bit is set.
    pub fn has_right(&self) -> bool {
        self.0 & Self::RIGHT != 0
    }

    /// Returns `true` if the middle bit is set.
    pub fn has_middle(&self) -> bool {
        self.0 & Self::MIDDLE != 0
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// One high-level intent for the firmware.
///
/// Key payloads are decimal Arduino key codes rendered as strings (e.g. `"58"`
/// for F1); see [`crate::keymap::arduino`] for the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Hold a key down until a matching [`Command::ReleaseKey`].
    PressKey(String),
    /// Release a previously pressed key.
    ReleaseKey(String),
    /// Type a literal string.  Delimiter characters are not escaped.
    TypeString(String),
    /// Press all keys in order, then release them.  Must not be empty.
    PressCombination(Vec<String>),
    /// Firmware-side pause in milliseconds.
    Delay(u32),
    /// Relative cursor movement.
    MouseMove { dx: i32, dy: i32 },
    MousePress(MouseButtons),
    MouseRelease(MouseButtons),
    MouseClick { buttons: MouseButtons, count: u32 },
    /// Scroll wheel movement; positive is away from the user.
    MouseWheel(i32),
}

impl Command {
    /// Returns the wire type id for this command.
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::PressKey(_) => CommandType::PressKey,
            Command::ReleaseKey(_) => CommandType::ReleaseKey,
            Command::TypeString(_) => CommandType::TypeString,
            Command::PressCombination(_) => CommandType::PressCombination,
            Command::Delay(_) => CommandType::Delay,
            Command::MouseMove { .. } => CommandType::MouseMove,
            Command::MousePress(_) => CommandType::MousePress,
            Command::MouseRelease(_) => CommandType::MouseRelease,
            Command::MouseClick { .. } => CommandType::MouseClick,
            Command::MouseWheel(_) => CommandType::MouseWheel,
        }
    }

    /// Builds a `PressKey` from a numeric key code.
    pub fn press_key(code: u16) -> Self {
        Command::PressKey(code.to_string())
    }

    /// Builds a `ReleaseKey` from a numeric key code.
    pub fn release_key(code: u16) -> Self {
        Command::ReleaseKey(code.to_string())
    }

    /// Builds a `PressCombination` from numeric key codes, keeping their order.
    pub fn combination(codes: &[u16]) -> Self {
        Command::PressCombination(codes.iter().map(u16::to_string).collect())
    }
}
