//! Thread-safe handle around the scheduler.
//!
//! The ticker and user actions both read-modify-write the same phase and
//! countdown, so every call goes through one mutex. Dispatcher hooks run
//! while the lock is held and must return quickly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use super::engine::IntervalScheduler;
use super::state::{BreakStats, PauseRequest, Phase, SchedulerSnapshot};
use crate::events::Event;

#[derive(Clone)]
pub struct SharedScheduler(Arc<Mutex<IntervalScheduler>>);

impl SharedScheduler {
    pub fn new(scheduler: IntervalScheduler) -> Self {
        Self(Arc::new(Mutex::new(scheduler)))
    }

    /// A panic in a dispatcher must not take the timer down with it.
    fn lock(&self) -> MutexGuard<'_, IntervalScheduler> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run several operations under a single lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut IntervalScheduler) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub fn stats(&self) -> BreakStats {
        self.lock().stats()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.lock().subscribe()
    }

    pub fn tick(&self) -> Option<Event> {
        self.lock().tick()
    }

    pub fn skip_break(&self) -> Option<Event> {
        self.lock().skip_break()
    }

    pub fn complete_break(&self) -> Option<Event> {
        self.lock().complete_break()
    }

    pub fn snooze_break(&self, minutes: u64) -> Option<Event> {
        self.lock().snooze_break(minutes)
    }

    pub fn pause(&self, request: PauseRequest) -> Option<Event> {
        self.lock().pause(request)
    }

    pub fn resume(&self) -> Option<Event> {
        self.lock().resume()
    }

    pub fn reset_timer(&self) -> Option<Event> {
        self.lock().reset_timer()
    }

    pub fn settings_changed(&self) -> Option<Event> {
        self.lock().settings_changed()
    }

    pub fn handle_system_sleep(&self) -> Option<Event> {
        self.lock().handle_system_sleep()
    }

    pub fn handle_system_wake(&self) -> Option<Event> {
        self.lock().handle_system_wake()
    }
}
