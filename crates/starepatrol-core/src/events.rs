use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// How a break came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakOutcome {
    /// Countdown reached zero or the break was completed explicitly.
    Taken,
    /// The user skipped the rest of the break.
    Skipped,
}

impl BreakOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakOutcome::Taken => "taken",
            BreakOutcome::Skipped => "skipped",
        }
    }
}

/// Who asked for a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseReason {
    User,
    Sleep,
}

/// Every phase change in the scheduler produces exactly one Event.
/// The driver gets it back from the call; subscribers receive a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    BreakStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BreakEnded {
        outcome: BreakOutcome,
        at: DateTime<Utc>,
    },
    BreakSnoozed {
        minutes: u64,
        at: DateTime<Utc>,
    },
    /// `duration_secs` is `None` for an indefinite pause.
    Paused {
        reason: PauseReason,
        duration_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    /// Back to a fresh work interval after a pause.
    Resumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The app was switched off; the countdown is frozen where it stood.
    Disabled {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::BreakStarted { .. } => "break_started",
            Event::BreakEnded { .. } => "break_ended",
            Event::BreakSnoozed { .. } => "break_snoozed",
            Event::Paused { .. } => "paused",
            Event::Resumed { .. } => "resumed",
            Event::TimerReset { .. } => "timer_reset",
            Event::SettingsApplied { .. } => "settings_applied",
            Event::Disabled { .. } => "disabled",
        }
    }
}
