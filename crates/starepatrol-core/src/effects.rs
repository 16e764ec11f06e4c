//! Side effects of a break transition.
//!
//! The scheduler never plays a sound or opens a window itself. It calls an
//! [`EffectDispatcher`] handed to it at construction, in a fixed order:
//!
//! ```text
//! break start: sound -> haptic -> show reminder
//! break end:   sound -> haptic -> hide reminder
//! ```
//!
//! Dispatchers are fire-and-forget. An implementation that needs slow I/O
//! must hand it off (a channel, a spawned task) and return immediately, and
//! must log its own failures instead of reporting them back.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::format::time_string;
use crate::storage::{NotificationMode, Settings};

/// Minutes offered by the Snooze action on a reminder.
pub const SNOOZE_MINUTES: u64 = 5;

/// Hooks the scheduler drives on every break transition.
///
/// Every hook must tolerate redundant calls (hiding a reminder that is
/// not shown, and so on).
pub trait EffectDispatcher: Send + Sync {
    fn play_sound(&self, name: &str);
    fn trigger_haptic(&self);
    fn show_reminder(&self, reminder: &Reminder);
    fn hide_reminder(&self);
}

impl<T: EffectDispatcher + ?Sized> EffectDispatcher for Arc<T> {
    fn play_sound(&self, name: &str) {
        (**self).play_sound(name)
    }
    fn trigger_haptic(&self) {
        (**self).trigger_haptic()
    }
    fn show_reminder(&self, reminder: &Reminder) {
        (**self).show_reminder(reminder)
    }
    fn hide_reminder(&self) {
        (**self).hide_reminder()
    }
}

/// Dispatcher that does nothing. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

impl EffectDispatcher for NoopDispatcher {
    fn play_sound(&self, _name: &str) {}
    fn trigger_haptic(&self) {}
    fn show_reminder(&self, _reminder: &Reminder) {}
    fn hide_reminder(&self) {}
}

/// Action a reminder may offer back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ReminderAction {
    Snooze { minutes: u64 },
    Skip,
}

impl ReminderAction {
    /// Identifier attached to a system notification button.
    pub fn identifier(self) -> &'static str {
        match self {
            ReminderAction::Snooze { .. } => "SNOOZE_ACTION",
            ReminderAction::Skip => "SKIP_ACTION",
        }
    }

    /// Map a notification response back to an action.
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id {
            "SNOOZE_ACTION" => Some(ReminderAction::Snooze {
                minutes: SNOOZE_MINUTES,
            }),
            "SKIP_ACTION" => Some(ReminderAction::Skip),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            ReminderAction::Snooze { minutes } => format!("Snooze {minutes}m"),
            ReminderAction::Skip => "Skip".to_string(),
        }
    }
}

/// What a dispatcher needs to render a break reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub mode: NotificationMode,
    pub message: String,
    pub duration_secs: u64,
    pub time_string: String,
    /// Empty in strict mode.
    pub actions: Vec<ReminderAction>,
}

impl Reminder {
    /// Build the reminder for a break of `duration_secs`.
    ///
    /// Returns `None` when the notification mode shows nothing.
    pub fn for_break(settings: &Settings, duration_secs: u64) -> Option<Self> {
        if settings.notification_mode == NotificationMode::Off {
            return None;
        }
        let actions = if settings.strict_mode {
            Vec::new()
        } else {
            vec![
                ReminderAction::Snooze {
                    minutes: SNOOZE_MINUTES,
                },
                ReminderAction::Skip,
            ]
        };
        Some(Self {
            mode: settings.notification_mode,
            message: settings.reminder_message.clone(),
            duration_secs,
            time_string: time_string(duration_secs),
            actions,
        })
    }
}

pub(crate) fn dispatch_break_start(
    dispatcher: &dyn EffectDispatcher,
    settings: &Settings,
    duration_secs: u64,
) {
    if let Some(sound) = settings.break_start_sound() {
        dispatcher.play_sound(sound);
    }
    if settings.haptics_enabled {
        dispatcher.trigger_haptic();
    }
    if let Some(reminder) = Reminder::for_break(settings, duration_secs) {
        dispatcher.show_reminder(&reminder);
    }
}

pub(crate) fn dispatch_break_end(dispatcher: &dyn EffectDispatcher, settings: &Settings) {
    if let Some(sound) = settings.break_end_sound() {
        dispatcher.play_sound(sound);
    }
    if settings.haptics_enabled {
        dispatcher.trigger_haptic();
    }
    dispatcher.hide_reminder();
}
