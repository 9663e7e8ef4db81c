//! TOML-based settings persistence.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate location:
//! - Windows:  `%APPDATA%\KeyPresser\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/keypresser/config.toml` or `~/.config/keypresser/config.toml`
//! - macOS:    `~/Library/Application Support/KeyPresser/config.toml`
//!
//! Any file path can also be imported or exported with [`load_config_from`] and
//! [`save_config_to`].  Clearing the settings is `AppConfig::default()`.
//!
//! ```toml
//! [general]
//! trigger_mode = "independent"
//! keep_topmost = false
//! trigger_hotkey = "Home"
//!
//! [serial]
//! baud_rate = 9600
//! press_duration_ms = 100
//!
//! [[slots]]
//! enabled = true
//! key = "F1"
//! modifiers = "Ctrl"
//! min_interval_ms = 900
//! max_interval_ms = 1300
//! ```
//!
//! Every field has a serde default, so a partial or empty file loads cleanly
//! and missing slots fall back to their defaults.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use keypresser_core::keymap::{key_code, key_name, trigger_vk, KeymapError, ModifierPreset};
use keypresser_core::{EmitterConfig, EmitterTable, IntervalRange, TimedWindow, TriggerMode, SLOT_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A key, modifier, or hotkey name is not in the key tables.
    #[error(transparent)]
    Keymap(#[from] KeymapError),

    /// More slots than the scheduler supports.
    #[error("config lists {0} slots, at most {max} are supported", max = SLOT_COUNT)]
    TooManySlots(usize),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub space: SpaceConfig,
    #[serde(default = "default_slots")]
    pub slots: Vec<SlotConfig>,
    #[serde(default)]
    pub timed_task: TimedTaskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub trigger_mode: TriggerMode,
    /// Restore and raise the target window before every press.
    #[serde(default)]
    pub keep_topmost: bool,
    /// Name of the start/stop hotkey, e.g. `"Home"` or `"F8"`.
    #[serde(default = "default_trigger_hotkey")]
    pub trigger_hotkey: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Fixed port name.  When absent the port is discovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Hold time between press and release of a single key.
    #[serde(default = "default_press_duration_ms")]
    pub press_duration_ms: u64,
    /// Log every discovery attempt at `info`.
    #[serde(default)]
    pub verbose_discovery: bool,
}

/// Dedicated space emitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpaceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub max_interval_ms: u64,
}

/// One key slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Key name from the key table, e.g. `"F1"`, `"A"`, `"Page Up"`.  Empty
    /// means the slot's default key.
    #[serde(default)]
    pub key: String,
    /// Modifier preset label, e.g. `"Ctrl+Alt"`; empty for none.
    #[serde(default)]
    pub modifiers: String,
    #[serde(default = "default_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub max_interval_ms: u64,
}

/// Wall-clock automation window, in local time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimedTaskConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_trigger_hotkey() -> String {
    "Home".to_string()
}
fn default_baud_rate() -> u32 {
    9600
}
fn default_press_duration_ms() -> u64 {
    100
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_slots() -> Vec<SlotConfig> {
    (0..SLOT_COUNT).map(SlotConfig::default_for).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            serial: SerialConfig::default(),
            space: SpaceConfig::default(),
            slots: default_slots(),
            timed_task: TimedTaskConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            trigger_mode: TriggerMode::default(),
            keep_topmost: false,
            trigger_hotkey: default_trigger_hotkey(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            press_duration_ms: default_press_duration_ms(),
            verbose_discovery: false,
        }
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_interval_ms: default_interval_ms(),
            max_interval_ms: default_interval_ms(),
        }
    }
}

impl SlotConfig {
    /// Default for slot `index`: the key the emitter table puts there.
    fn default_for(index: usize) -> Self {
        let table = EmitterTable::default();
        let code = table.slots.get(index).map_or(0, |slot| slot.key_code);
        Self {
            enabled: false,
            key: key_name(code).unwrap_or_default().to_string(),
            modifiers: String::new(),
            min_interval_ms: default_interval_ms(),
            max_interval_ms: default_interval_ms(),
        }
    }

    /// `default` supplies the key code when `key` is blank.
    fn to_emitter(&self, default: &EmitterConfig) -> Result<EmitterConfig, ConfigError> {
        let code = if self.key.trim().is_empty() {
            default.key_code
        } else {
            key_code(&self.key).ok_or_else(|| KeymapError::UnknownKey(self.key.clone()))?
        };
        let preset: ModifierPreset = self.modifiers.parse()?;
        Ok(EmitterConfig {
            enabled: self.enabled,
            key_code: code,
            modifiers: preset.codes().to_vec(),
            interval: IntervalRange::new(self.min_interval_ms, self.max_interval_ms),
        })
    }
}

// ── Mapping to the scheduler's types ──────────────────────────────────────────

impl AppConfig {
    /// Builds the scheduler's emitter table.
    ///
    /// Slots missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Keymap`] for an unknown key or modifier name and
    /// [`ConfigError::TooManySlots`] when more than [`SLOT_COUNT`] are listed.
    pub fn emitter_table(&self) -> Result<EmitterTable, ConfigError> {
        if self.slots.len() > SLOT_COUNT {
            return Err(ConfigError::TooManySlots(self.slots.len()));
        }
        let mut table = EmitterTable::default();
        for (slot, cfg) in table.slots.iter_mut().zip(&self.slots) {
            *slot = cfg.to_emitter(slot)?;
        }
        table.space.enabled = self.space.enabled;
        table.space.interval =
            IntervalRange::new(self.space.min_interval_ms, self.space.max_interval_ms);
        Ok(table)
    }

    /// The automation window, once both ends are configured.
    pub fn timed_window(&self) -> Option<TimedWindow> {
        let t = &self.timed_task;
        Some(TimedWindow {
            enabled: t.enabled,
            start: t.start?,
            end: t.end?,
        })
    }

    /// Windows VK code of the configured trigger hotkey.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Keymap`] if the name is not a selectable hotkey.
    pub fn trigger_hotkey_vk(&self) -> Result<u8, ConfigError> {
        trigger_vk(&self.general.trigger_hotkey).ok_or_else(|| {
            ConfigError::Keymap(KeymapError::UnknownHotkey(
                self.general.trigger_hotkey.clone(),
            ))
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// See [`config_dir`].
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the default config file, or `AppConfig::default()` if it does not
/// exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads settings from `path`, or defaults if the file does not exist.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Writes `config` to `path`, replacing whatever was there.
///
/// # Errors
///
/// Same as [`save_config`].
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KeyPresser"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keypresser"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeyPresser")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("keypresser_test_{}", Uuid::new_v4()))
            .join("config.toml")
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_has_fifteen_disabled_slots() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.slots.len(), SLOT_COUNT);
        assert!(cfg.slots.iter().all(|s| !s.enabled));
        assert_eq!(cfg.slots[0].key, "F1");
        assert_eq!(cfg.slots[11].key, "F12");
        assert_eq!(cfg.slots[12].key, "A");
        assert_eq!(cfg.slots[14].key, "C");
    }

    #[test]
    fn test_default_general_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.general.trigger_mode, TriggerMode::Independent);
        assert!(!cfg.general.keep_topmost);
        assert_eq!(cfg.general.trigger_hotkey, "Home");
        assert_eq!(cfg.general.log_level, "info");
    }

    #[test]
    fn test_default_serial_settings() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.press_duration_ms, 100);
        assert!(cfg.port.is_none());
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_loads_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        // Arrange
        let text = r#"
            [general]
            trigger_mode = "sequential"

            [[slots]]
            enabled = true
            key = "Page Up"
            modifiers = "Shift+Alt"
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).expect("parse");
        let table = cfg.emitter_table().expect("table");

        // Assert
        assert_eq!(cfg.general.trigger_mode, TriggerMode::Sequential);
        assert_eq!(cfg.serial.baud_rate, 9600);
        assert!(table.slots[0].enabled);
        assert_eq!(table.slots[0].key_code, 0x4B);
        assert_eq!(table.slots[0].modifiers, vec![129, 130]);
        assert_eq!(table.slots[0].interval, IntervalRange::fixed(1000));
        assert_eq!(table.slots[1].key_code, 0x3B, "missing slots keep defaults");
    }

    #[test]
    fn test_slot_without_key_uses_slot_default() {
        // Arrange
        let text = "[[slots]]\nenabled = true\n\n[[slots]]\nkey = \"\"\n";

        // Act
        let cfg: AppConfig = toml::from_str(text).expect("parse");
        let table = cfg.emitter_table().expect("table");

        // Assert
        assert!(cfg.slots[0].key.is_empty());
        assert!(table.slots[0].enabled);
        assert_eq!(table.slots[0].key_code, 0x3A);
        assert_eq!(table.slots[1].key_code, 0x3B);
    }

    #[test]
    fn test_unknown_trigger_mode_is_parse_error() {
        let result: Result<AppConfig, _> = toml::from_str("[general]\ntrigger_mode = \"chaotic\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.serial.port = Some("COM5".to_string());
        cfg.space.enabled = true;
        cfg.slots[3].enabled = true;
        cfg.slots[3].modifiers = "Ctrl".to_string();
        cfg.timed_task.start = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(8, 0, 0));

        // Act
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&text).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    // ── Mapping ───────────────────────────────────────────────────────────────

    #[test]
    fn test_emitter_table_maps_space_settings() {
        let mut cfg = AppConfig::default();
        cfg.space.enabled = true;
        cfg.space.min_interval_ms = 300;
        cfg.space.max_interval_ms = 200;

        let table = cfg.emitter_table().expect("table");

        assert!(table.space.enabled);
        assert_eq!(table.space.key_code, 32);
        assert_eq!(table.space.interval.bounds(), (200, 300));
    }

    #[test]
    fn test_emitter_table_rejects_unknown_key() {
        let mut cfg = AppConfig::default();
        cfg.slots[0].key = "Hyper".to_string();
        assert!(matches!(
            cfg.emitter_table(),
            Err(ConfigError::Keymap(KeymapError::UnknownKey(_)))
        ));
    }

    #[test]
    fn test_emitter_table_rejects_unknown_modifier() {
        let mut cfg = AppConfig::default();
        cfg.slots[2].modifiers = "Ctrl+Hyper".to_string();
        assert!(matches!(
            cfg.emitter_table(),
            Err(ConfigError::Keymap(KeymapError::UnknownModifier(_)))
        ));
    }

    #[test]
    fn test_emitter_table_rejects_extra_slots() {
        let mut cfg = AppConfig::default();
        cfg.slots.push(SlotConfig::default_for(0));
        assert!(matches!(cfg.emitter_table(), Err(ConfigError::TooManySlots(16))));
    }

    #[test]
    fn test_timed_window_requires_both_ends() {
        let mut cfg = AppConfig::default();
        cfg.timed_task.enabled = true;
        assert!(cfg.timed_window().is_none());

        cfg.timed_task.start = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(8, 0, 0));
        cfg.timed_task.end = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(9, 0, 0));
        let window = cfg.timed_window().expect("window");
        assert!(window.enabled);
    }

    #[test]
    fn test_trigger_hotkey_vk_resolves_default() {
        assert_eq!(AppConfig::default().trigger_hotkey_vk().expect("vk"), 0x24);
    }

    // ── File round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange
        let path = scratch_file();
        let mut cfg = AppConfig::default();
        cfg.general.keep_topmost = true;
        cfg.slots[14].enabled = true;

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let loaded = load_config_from(&scratch_file()).expect("load");
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let path = scratch_file();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).expect("mkdir");
        }
        std::fs::write(&path, "[general\nbroken").expect("write");

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
