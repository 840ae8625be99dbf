//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Study/break lengths of the short and long presets
//! - The preset selected at launch
//! - Tick period and the duration range offered to the user
//!
//! Configuration is stored at `~/.config/pomodoro/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::timer::{Clock, PresetMode, Presets, TimerController};

/// Timer behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default)]
    pub default_preset: PresetMode,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Smallest duration the duration picker offers, in minutes.
    #[serde(default = "default_slider_min")]
    pub slider_min: u32,
    /// Largest duration the duration picker offers, in minutes.
    #[serde(default = "default_slider_max")]
    pub slider_max: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomodoro/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub presets: Presets,
    #[serde(default)]
    pub timer: TimerConfig,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_slider_min() -> u32 {
    25
}
fn default_slider_max() -> u32 {
    60
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_preset: PresetMode::Short,
            tick_interval_ms: default_tick_interval_ms(),
            slider_min: default_slider_min(),
            slider_max: default_slider_max(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presets: Presets::default(),
            timer: TimerConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!(
                                "cannot parse '{value}' as a whole number"
                            )));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(CoreError::Config(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (mode, durations) in [
            (PresetMode::Short, self.presets.short),
            (PresetMode::Long, self.presets.long),
        ] {
            if durations.study_minutes == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("presets.{mode}.study_minutes"),
                    message: "must be at least 1".into(),
                });
            }
            if durations.break_minutes == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("presets.{mode}.break_minutes"),
                    message: "must be at least 1".into(),
                });
            }
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.timer.slider_min == 0 || self.timer.slider_min > self.timer.slider_max {
            return Err(ConfigError::InvalidValue {
                key: "timer.slider_min".into(),
                message: format!(
                    "range {}..={} is empty or starts at zero",
                    self.timer.slider_min, self.timer.slider_max
                ),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the result fails validation; `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms)
    }

    /// Whether `minutes` lies inside the range offered to the user.
    pub fn in_slider_range(&self, minutes: f64) -> bool {
        minutes >= f64::from(self.timer.slider_min) && minutes <= f64::from(self.timer.slider_max)
    }

    /// A controller on `clock` using the configured presets, with the default
    /// preset selected and its study length shown.
    pub fn build_controller<C: Clock>(&self, clock: C) -> TimerController<C> {
        TimerController::with_preset(clock, self.presets, self.timer.default_preset)
    }
}
