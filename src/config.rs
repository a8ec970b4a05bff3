//! Settings management for attention-please.
//!
//! This module handles the `settings.yaml` document in the per-user config
//! directory. Fields are fixed at compile time; unknown keys are rejected
//! when the file is parsed.

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default refresh period of the elapsed-time display.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;

/// A `#RRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// White, the default background.
    pub const WHITE: Self = Self { r: 0xFF, g: 0xFF, b: 0xFF };

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] if the string is not six hex digits.
    pub fn parse(value: &str) -> Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidSetting(format!(
                "color must look like #RRGGBB, got {value:?}"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::InvalidSetting(format!("color {value:?}: {e}")))
        };
        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// User settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Background color of the widget.
    #[serde(default)]
    pub background_color: Color,

    /// Keep the widget above other windows.
    #[serde(default = "default_always_on_top")]
    pub always_on_top: bool,

    /// Seconds between refreshes of the elapsed-time display.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Append store and export activity to `activity.jsonl` in the data dir.
    #[serde(default)]
    pub debug_logging: bool,
}

const fn default_always_on_top() -> bool {
    true
}

const fn default_tick_interval_secs() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: Color::default(),
            always_on_top: default_always_on_top(),
            tick_interval_secs: default_tick_interval_secs(),
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed YAML, unknown keys, or invalid values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a config directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(config_dir: &Path) -> Result<Option<Self>> {
        let path = paths::settings_path(config_dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content).map(Some)
    }

    /// Save settings to a config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, config_dir: &Path) -> Result<()> {
        self.validate()?;
        std::fs::create_dir_all(config_dir)?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(paths::settings_path(config_dir), content)?;
        Ok(())
    }

    /// Load settings, writing defaults first if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or saved.
    pub fn ensure_in(config_dir: &Path) -> Result<Self> {
        if let Some(settings) = Self::load_from(config_dir)? {
            return Ok(settings);
        }

        let settings = Self::default();
        settings.save_to(config_dir)?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_secs == 0 {
            return Err(Error::InvalidSetting("tick_interval_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.background_color, Color::WHITE);
        assert!(settings.always_on_top);
        assert_eq!(settings.tick_interval_secs, 10);
        assert!(!settings.debug_logging);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::load_from(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            background_color: Color { r: 0x12, g: 0xAB, b: 0x00 },
            always_on_top: false,
            tick_interval_secs: 30,
            debug_logging: true,
        };
        settings.save_to(dir.path()).unwrap();

        let loaded = Settings::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_saved_file_is_human_readable() {
        let dir = TempDir::new().unwrap();
        Settings::default().save_to(dir.path()).unwrap();
        let content = std::fs::read_to_string(paths::settings_path(dir.path())).unwrap();
        assert!(content.contains("background_color:"));
        assert!(content.contains("#FFFFFF"));
        assert!(content.contains("tick_interval_secs: 10"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = Settings::from_yaml("background_color: '#000000'\n").unwrap();
        assert_eq!(settings.background_color, Color { r: 0, g: 0, b: 0 });
        assert!(settings.always_on_top);
        assert_eq!(settings.tick_interval_secs, DEFAULT_TICK_INTERVAL_SECS);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_yaml("background_colour: '#000000'\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        assert!(err.to_string().contains("background_colour"));
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(Settings::from_yaml("background_color: 'blue'\n").is_err());
    }

    #[test]
    fn test_zero_tick_rejected() {
        let err = Settings::from_yaml("tick_interval_secs: 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSetting(_)));
    }

    #[test]
    fn test_ensure_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::ensure_in(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(paths::settings_path(dir.path()).exists());
    }

    #[test]
    fn test_ensure_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let custom = Settings { tick_interval_secs: 5, ..Default::default() };
        custom.save_to(dir.path()).unwrap();
        assert_eq!(Settings::ensure_in(dir.path()).unwrap(), custom);
    }

    #[test]
    fn test_color_parse_with_and_without_hash() {
        assert_eq!(Color::parse("#ff8000").unwrap(), Color { r: 255, g: 128, b: 0 });
        assert_eq!(Color::parse("FF8000").unwrap(), Color { r: 255, g: 128, b: 0 });
    }

    #[test]
    fn test_color_parse_rejects_bad_input() {
        assert!(Color::parse("#fff").is_err());
        assert!(Color::parse("#gg0000").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn test_color_display_uppercase() {
        assert_eq!(Color { r: 0x0a, g: 0xbc, b: 0xde }.to_string(), "#0ABCDE");
    }
}
