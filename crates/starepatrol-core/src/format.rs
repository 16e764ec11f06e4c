//! Display helpers for the menu bar, reminders and pause picker.

use crate::timer::{Phase, SchedulerSnapshot};

/// Pause presets in minutes. The last entry means "indefinitely".
pub const PAUSE_SNAP_MINUTES: [u64; 13] = [1, 2, 3, 5, 10, 15, 20, 30, 45, 60, 90, 120, 9999];

/// Sentinel preset for an indefinite pause.
pub const INDEFINITE_PAUSE_MINUTES: u64 = 9999;

/// Preset selected by default (10 minutes).
pub const DEFAULT_PAUSE_INDEX: usize = 4;

/// Render seconds as `MM:SS`. Minutes are not capped, so 3661 is `61:01`.
pub fn time_string(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Nearest pause preset to `raw` minutes. Ties go to the smaller preset.
pub fn snap_pause(raw: f64) -> u64 {
    let mut best = PAUSE_SNAP_MINUTES[0];
    for &candidate in &PAUSE_SNAP_MINUTES[1..] {
        if (candidate as f64 - raw).abs() < (best as f64 - raw).abs() {
            best = candidate;
        }
    }
    best
}

/// Human-readable pause length: `∞`, `1h`, `1h 30m`, `15m`.
pub fn format_pause(minutes: u64) -> String {
    if minutes >= INDEFINITE_PAUSE_MINUTES {
        return "∞".to_string();
    }
    if minutes >= 60 {
        let h = minutes / 60;
        let rem = minutes % 60;
        return if rem == 0 {
            format!("{h}h")
        } else {
            format!("{h}h {rem}m")
        };
    }
    format!("{minutes}m")
}

/// One-line description of what the scheduler is doing.
pub fn status_line(snapshot: &SchedulerSnapshot) -> String {
    match snapshot.phase {
        Phase::Breaking => "Rest your eyes – look 20ft away".to_string(),
        Phase::PausedTimed => format!("Resumes in {}", time_string(snapshot.remaining_secs)),
        Phase::PausedIndefinite => "Paused indefinitely".to_string(),
        Phase::Working => format!("Next break in {}", time_string(snapshot.remaining_secs)),
    }
}
