//! Validated settings as the scheduler sees them.
//!
//! The scheduler never reads the config file. It asks a [`SettingsSource`]
//! for the current values on every tick and transition, so a host can swap
//! in whatever store it owns.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use super::config::Config;

/// Smallest interval the scheduler will ever see.
pub const MIN_INTERVAL_SECS: u64 = 1;

/// How a break reminder is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationMode {
    /// Overlay covering the screen.
    #[default]
    Fullscreen,
    /// OS notification, with Skip/Snooze actions outside strict mode.
    SystemNotification,
    /// No visual reminder at all.
    #[serde(rename = "none")]
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub work_interval_secs: u64,
    pub break_interval_secs: u64,
    pub app_enabled: bool,
    /// Disables skip and snooze.
    pub strict_mode: bool,
    pub notification_mode: NotificationMode,
    pub reminder_message: String,
    pub sound_name: String,
    /// Master gate over both break sounds.
    pub sound_enabled: bool,
    pub break_start_sound_enabled: bool,
    pub break_end_sound_enabled: bool,
    pub haptics_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

impl Settings {
    /// Default settings with the given intervals, clamped to the minimum.
    pub fn with_intervals(work_secs: u64, break_secs: u64) -> Self {
        Self {
            work_interval_secs: work_secs.max(MIN_INTERVAL_SECS),
            break_interval_secs: break_secs.max(MIN_INTERVAL_SECS),
            ..Self::default()
        }
    }

    pub fn break_start_sound(&self) -> Option<&str> {
        (self.sound_enabled && self.break_start_sound_enabled).then_some(self.sound_name.as_str())
    }

    pub fn break_end_sound(&self) -> Option<&str> {
        (self.sound_enabled && self.break_end_sound_enabled).then_some(self.sound_name.as_str())
    }
}

/// Where the scheduler reads its settings from.
pub trait SettingsSource: Send + Sync {
    fn current(&self) -> Settings;
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn current(&self) -> Settings {
        (**self).current()
    }
}

/// A fixed value never changes underneath the scheduler.
impl SettingsSource for Settings {
    fn current(&self) -> Settings {
        self.clone()
    }
}

/// Settings shared between the host and the scheduler.
///
/// Cloning yields another handle to the same values. Updates become
/// visible to the scheduler immediately; call
/// `settings_changed()` afterwards to re-derive the countdown.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<RwLock<Settings>>);

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn replace(&self, settings: Settings) {
        let mut guard = self.0.write().unwrap_or_else(|e| e.into_inner());
        *guard = settings;
    }

    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut guard = self.0.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl SettingsSource for SharedSettings {
    fn current(&self) -> Settings {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
