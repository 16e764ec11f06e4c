//! Line commands accepted on stdin while `starepatrol run` is active.

use std::str::FromStr;

use starepatrol_core::{PauseRequest, ReminderAction, SNOOZE_MINUTES};

pub const HELP: &str = "commands: status | skip | snooze [min] | complete | pause [min|inf] | resume | reset | reload | sleep | wake | quit (reminder action ids are accepted too)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Status,
    Skip,
    Snooze { minutes: u64 },
    Complete,
    Pause(PauseRequest),
    Resume,
    Reset,
    /// Re-read the config file and apply it.
    Reload,
    Sleep,
    Wake,
    Help,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // Ids printed next to a reminder's actions answer that reminder.
        if let Some(action) = ReminderAction::from_identifier(line.trim()) {
            return Ok(action.into());
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_ascii_lowercase();
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument '{extra}'"));
        }

        let cmd = match (verb.as_str(), arg) {
            ("status", None) => ControlCommand::Status,
            ("skip", None) => ControlCommand::Skip,
            ("snooze", None) => ControlCommand::Snooze {
                minutes: SNOOZE_MINUTES,
            },
            ("snooze", Some(m)) => ControlCommand::Snooze {
                minutes: m
                    .parse()
                    .map_err(|_| format!("snooze expects minutes, got '{m}'"))?,
            },
            ("complete", None) => ControlCommand::Complete,
            ("pause", arg) => ControlCommand::Pause(arg.unwrap_or("inf").parse()?),
            ("resume", None) => ControlCommand::Resume,
            ("reset", None) => ControlCommand::Reset,
            ("reload", None) => ControlCommand::Reload,
            ("sleep", None) => ControlCommand::Sleep,
            ("wake", None) => ControlCommand::Wake,
            ("help" | "?", None) => ControlCommand::Help,
            ("quit" | "exit", None) => ControlCommand::Quit,
            ("", _) => return Err("empty command".to_string()),
            (verb, Some(arg)) => return Err(format!("'{verb}' takes no argument '{arg}'")),
            (verb, None) => return Err(format!("unknown command '{verb}'")),
        };
        Ok(cmd)
    }
}

impl From<ReminderAction> for ControlCommand {
    fn from(action: ReminderAction) -> Self {
        match action {
            ReminderAction::Snooze { minutes } => ControlCommand::Snooze { minutes },
            ReminderAction::Skip => ControlCommand::Skip,
        }
    }
}
