use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::format::INDEFINITE_PAUSE_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Working,
    Breaking,
    /// Paused with a countdown back to work.
    PausedTimed,
    /// Paused until resumed (or woken, if sleep caused it).
    PausedIndefinite,
}

impl Phase {
    pub fn is_paused(self) -> bool {
        matches!(self, Phase::PausedTimed | Phase::PausedIndefinite)
    }

    /// Status pill text.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Working => "ACTIVE",
            Phase::Breaking => "BREAK",
            Phase::PausedTimed | Phase::PausedIndefinite => "PAUSED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Working => "working",
            Phase::Breaking => "breaking",
            Phase::PausedTimed => "paused (timed)",
            Phase::PausedIndefinite => "paused (indefinite)",
        };
        f.write_str(name)
    }
}

/// Break counters. Each transition changes them at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreakStats {
    pub breaks_taken: u64,
    pub breaks_skipped: u64,
}

/// Read-only view of the scheduler for UI layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub phase: Phase,
    pub status: String,
    pub remaining_secs: u64,
    pub time_string: String,
    pub ticking: bool,
    pub auto_paused_for_sleep: bool,
    pub stats: BreakStats,
}

/// A pause as picked from the presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseRequest {
    For { minutes: u64 },
    Indefinitely,
}

impl PauseRequest {
    /// The indefinite preset (and anything above it) maps to `Indefinitely`.
    pub fn from_minutes(minutes: u64) -> Self {
        if minutes >= INDEFINITE_PAUSE_MINUTES {
            PauseRequest::Indefinitely
        } else {
            PauseRequest::For { minutes }
        }
    }
}

impl FromStr for PauseRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "inf" | "indefinite" | "indefinitely" | "∞" => Ok(PauseRequest::Indefinitely),
            other => other
                .parse::<u64>()
                .map(PauseRequest::from_minutes)
                .map_err(|_| format!("expected minutes or 'inf', got '{other}'")),
        }
    }
}
