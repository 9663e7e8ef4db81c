//! Emitter configuration: one per key slot plus the dedicated space emitter.

use serde::{Deserialize, Serialize};

use super::interval::IntervalRange;
use crate::keymap::arduino::{KEY_F1, KEY_SPACE};

/// Number of configurable key slots.
pub const SLOT_COUNT: usize = 15;

/// What one emitter tick sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStroke {
    /// Press, hold for the press duration, release.
    Single(u16),
    /// Modifiers followed by the key, sent as one combination frame.
    Combination(Vec<u16>),
}

/// Configuration of one scheduled key source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub enabled: bool,
    pub key_code: u16,
    /// Modifier codes pressed before the key, in order.  Possibly empty.
    pub modifiers: Vec<u16>,
    pub interval: IntervalRange,
}

impl EmitterConfig {
    /// A disabled emitter for `key_code` with no modifiers and a 1 s interval.
    pub fn new(key_code: u16) -> Self {
        Self {
            enabled: false,
            key_code,
            modifiers: Vec::new(),
            interval: IntervalRange::default(),
        }
    }

    /// The stroke this emitter sends on each tick.
    ///
    /// An empty modifier list never produces a combination.
    pub fn keystroke(&self) -> KeyStroke {
        if self.modifiers.is_empty() {
            KeyStroke::Single(self.key_code)
        } else {
            let mut codes = self.modifiers.clone();
            codes.push(self.key_code);
            KeyStroke::Combination(codes)
        }
    }
}

/// All emitters the scheduler can arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterTable {
    pub slots: Vec<EmitterConfig>,
    pub space: EmitterConfig,
}

impl EmitterTable {
    /// Slots with `enabled == true` as `(slot index, config)`, ascending.
    pub fn enabled_slots(&self) -> Vec<(usize, &EmitterConfig)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.enabled)
            .collect()
    }

    /// `true` when neither a slot nor the space emitter is enabled.
    pub fn is_idle(&self) -> bool {
        !self.space.enabled && self.slots.iter().all(|slot| !slot.enabled)
    }
}

impl Default for EmitterTable {
    /// Slots 0..=11 default to F1..F12 and 12..=14 to A, B, C; all disabled.
    fn default() -> Self {
        let slots = (0..SLOT_COUNT)
            .map(|i| {
                let code = if i < 12 {
                    KEY_F1 + i as u16
                } else {
                    u16::from(b'A') + (i - 12) as u16
                };
                EmitterConfig::new(code)
            })
            .collect();
        Self {
            slots,
            space: EmitterConfig::new(KEY_SPACE),
        }
    }
}
