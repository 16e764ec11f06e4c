//! TOML-based application configuration.
//!
//! Stores the user preferences the scheduler reads:
//! - Work and break intervals
//! - Master enable switch and strict mode
//! - Reminder presentation (notification mode, message)
//! - Sound and haptic toggles
//!
//! Configuration is stored at `~/.config/starepatrol/config.toml`.
//! Keys use the camelCase names of the settings surface
//! (`workIntervalMinutes`, `strictMode`, ...).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use super::settings::{NotificationMode, Settings, MIN_INTERVAL_SECS};
use crate::error::ConfigError;

pub const DEFAULT_REMINDER_MESSAGE: &str =
    "Time to rest your eyes! Look at something 20 feet away.";

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/starepatrol/config.toml`.
/// Values are stored as the user entered them; [`Config::settings`]
/// is the validation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_work_minutes")]
    pub work_interval_minutes: i64,
    #[serde(default = "default_break_seconds")]
    pub break_interval_seconds: i64,
    #[serde(default = "default_true")]
    pub app_enabled: bool,
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default)]
    pub notification_mode: NotificationMode,
    #[serde(default = "default_reminder_message")]
    pub custom_reminder_message: String,
    #[serde(default = "default_sound_name")]
    pub selected_sound_name: String,
    #[serde(default = "default_true")]
    pub is_sound_enabled: bool,
    #[serde(default = "default_true")]
    pub break_start_sound_enabled: bool,
    #[serde(default = "default_true")]
    pub break_end_sound_enabled: bool,
    #[serde(default = "default_true")]
    pub is_haptics_enabled: bool,
}

// Default functions
fn default_work_minutes() -> i64 {
    20
}
fn default_break_seconds() -> i64 {
    20
}
fn default_true() -> bool {
    true
}
fn default_reminder_message() -> String {
    DEFAULT_REMINDER_MESSAGE.into()
}
fn default_sound_name() -> String {
    "Glass".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_interval_minutes: default_work_minutes(),
            break_interval_seconds: default_break_seconds(),
            app_enabled: true,
            strict_mode: false,
            notification_mode: NotificationMode::default(),
            custom_reminder_message: default_reminder_message(),
            selected_sound_name: default_sound_name(),
            is_sound_enabled: true,
            break_start_sound_enabled: true,
            break_end_sound_enabled: true,
            is_haptics_enabled: true,
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
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

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
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
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

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("falling back to default configuration: {e}");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not
    /// fit the key's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Validated view for the scheduler.
    ///
    /// Non-positive intervals are clamped to one second.
    pub fn settings(&self) -> Settings {
        let work_secs = clamp_interval(
            "workIntervalMinutes",
            self.work_interval_minutes.saturating_mul(60),
        );
        let break_secs = clamp_interval("breakIntervalSeconds", self.break_interval_seconds);

        Settings {
            work_interval_secs: work_secs,
            break_interval_secs: break_secs,
            app_enabled: self.app_enabled,
            strict_mode: self.strict_mode,
            notification_mode: self.notification_mode,
            reminder_message: self.custom_reminder_message.clone(),
            sound_name: self.selected_sound_name.clone(),
            sound_enabled: self.is_sound_enabled,
            break_start_sound_enabled: self.break_start_sound_enabled,
            break_end_sound_enabled: self.break_end_sound_enabled,
            haptics_enabled: self.is_haptics_enabled,
        }
    }
}

fn clamp_interval(key: &str, secs: i64) -> u64 {
    if secs < MIN_INTERVAL_SECS as i64 {
        tracing::warn!(key, value = secs, "interval below minimum, clamping to {MIN_INTERVAL_SECS}s");
        MIN_INTERVAL_SECS
    } else {
        secs as u64
    }
}
