//! # StarePatrol Core Library
//!
//! This library provides the core logic for the StarePatrol eye-rest
//! reminder (the "20-20-20" pattern: every 20 minutes, look 20 feet away
//! for 20 seconds). The CLI driver and any GUI shell are thin layers over
//! the same scheduler.
//!
//! ## Architecture
//!
//! - **Interval Scheduler**: A tick-driven state machine that requires the
//!   caller to invoke `tick()` once per second
//! - **Effects**: Dispatcher trait the scheduler calls for sound, haptic and
//!   reminder display, plus the policy deciding which hooks fire
//! - **Storage**: TOML-based configuration and SQLite break history
//!
//! ## Key Components
//!
//! - [`IntervalScheduler`]: Core work/break state machine
//! - [`SharedScheduler`]: Mutex handle shared by the ticker and user actions
//! - [`EffectDispatcher`]: Hooks for the OS-facing side effects
//! - [`Config`]: Application configuration management
//! - [`Database`]: Break statistics persistence

pub mod effects;
pub mod error;
pub mod events;
pub mod format;
pub mod storage;
pub mod timer;

pub use effects::{EffectDispatcher, NoopDispatcher, Reminder, ReminderAction, SNOOZE_MINUTES};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::{BreakOutcome, Event, PauseReason};
pub use format::{format_pause, snap_pause, status_line, time_string};
pub use storage::{Config, Database, NotificationMode, Settings, SettingsSource, SharedSettings};
pub use timer::{BreakStats, IntervalScheduler, PauseRequest, Phase, SchedulerSnapshot, SharedScheduler};
