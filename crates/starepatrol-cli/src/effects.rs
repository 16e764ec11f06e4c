//! Terminal rendition of the scheduler's side effects.
//!
//! The dispatcher only queues; a worker task owns the terminal and renders
//! effects in order, so a slow stderr never stalls the ticker.

use std::io::Write;

use starepatrol_core::{EffectDispatcher, NotificationMode, Reminder};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Sound(String),
    Haptic,
    Show(Reminder),
    Hide,
}

pub struct TerminalDispatcher {
    tx: mpsc::UnboundedSender<Effect>,
}

impl TerminalDispatcher {
    /// Create the dispatcher and spawn its render worker on the current runtime.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(render_loop(rx));
        (Self { tx }, worker)
    }

    fn send(&self, effect: Effect) {
        if self.tx.send(effect).is_err() {
            tracing::warn!("effect worker has stopped, dropping effect");
        }
    }
}

impl EffectDispatcher for TerminalDispatcher {
    fn play_sound(&self, name: &str) {
        self.send(Effect::Sound(name.to_string()));
    }

    fn trigger_haptic(&self) {
        self.send(Effect::Haptic);
    }

    fn show_reminder(&self, reminder: &Reminder) {
        self.send(Effect::Show(reminder.clone()));
    }

    fn hide_reminder(&self) {
        self.send(Effect::Hide);
    }
}

async fn render_loop(mut rx: mpsc::UnboundedReceiver<Effect>) {
    let mut screen = ReminderScreen::default();
    while let Some(effect) = rx.recv().await {
        let mut err = std::io::stderr();
        if let Err(e) = screen.render(&effect, &mut err) {
            tracing::warn!(error = %e, "failed to render effect");
        }
    }
    tracing::debug!("effect worker finished");
}

/// Tracks whether a reminder is on screen so a redundant hide prints nothing.
#[derive(Debug, Default)]
pub struct ReminderScreen {
    showing: bool,
}

impl ReminderScreen {
    pub fn render(&mut self, effect: &Effect, out: &mut impl Write) -> std::io::Result<()> {
        match effect {
            Effect::Sound(name) => {
                tracing::debug!(sound = %name, "play sound");
                // BEL is the only sound a plain terminal has.
                write!(out, "\x07")?;
            }
            Effect::Haptic => tracing::debug!("haptic feedback unavailable on a terminal"),
            Effect::Show(reminder) => {
                self.showing = true;
                let banner = match reminder.mode {
                    NotificationMode::Fullscreen => "=== BREAK ===",
                    _ => "[break]",
                };
                writeln!(out, "{banner} {} ({})", reminder.message, reminder.time_string)?;
                if !reminder.actions.is_empty() {
                    let labels: Vec<String> = reminder
                        .actions
                        .iter()
                        .map(|a| format!("{} [{}]", a.label(), a.identifier()))
                        .collect();
                    writeln!(out, "  actions: {}", labels.join(" | "))?;
                }
            }
            Effect::Hide => {
                if std::mem::take(&mut self.showing) {
                    writeln!(out, "break over, back to work")?;
                }
            }
        }
        out.flush()
    }
}
