//! Interval scheduler implementation.
//!
//! The scheduler is a tick-driven state machine. It does not use internal
//! threads or timers - the caller is responsible for calling `tick()` once
//! per second while the app runs.
//!
//! ## State Transitions
//!
//! ```text
//! Working --0--> Breaking --0 / complete / skip--> Working
//! Breaking --snooze--> PausedTimed --0 / resume--> Working
//! any --pause_app--> PausedTimed
//! any --pause_indefinitely / sleep--> PausedIndefinite --resume / wake--> Working
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = IntervalScheduler::new(settings, dispatcher);
//! // Once per second:
//! if let Some(event) = scheduler.tick() {
//!     // a phase changed
//! }
//! ```

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::state::{BreakStats, PauseRequest, Phase, SchedulerSnapshot};
use crate::effects::{dispatch_break_end, dispatch_break_start, EffectDispatcher, Reminder};
use crate::events::{BreakOutcome, Event, PauseReason};
use crate::format::time_string;
use crate::storage::{Settings, SettingsSource};

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Work/break interval state machine.
///
/// Every mutating call returns the [`Event`] it produced, or `None` when
/// the call did not apply in the current phase. The same event is
/// broadcast to every subscriber.
pub struct IntervalScheduler {
    settings: Box<dyn SettingsSource>,
    dispatcher: Box<dyn EffectDispatcher>,
    phase: Phase,
    remaining_secs: u64,
    /// Set only while paused because the machine went to sleep.
    auto_paused_for_sleep: bool,
    ticking: bool,
    stats: BreakStats,
    events: broadcast::Sender<Event>,
}

impl IntervalScheduler {
    /// Create a scheduler at the start of a fresh work interval.
    pub fn new<S, D>(settings: S, dispatcher: D) -> Self
    where
        S: SettingsSource + 'static,
        D: EffectDispatcher + 'static,
    {
        let current = settings.current();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            settings: Box::new(settings),
            dispatcher: Box::new(dispatcher),
            phase: Phase::Working,
            remaining_secs: current.work_interval_secs,
            auto_paused_for_sleep: false,
            ticking: current.app_enabled,
            stats: BreakStats::default(),
            events,
        }
    }

    /// Start counting from previously recorded totals.
    pub fn with_stats(mut self, stats: BreakStats) -> Self {
        self.stats = stats;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn is_auto_paused_for_sleep(&self) -> bool {
        self.auto_paused_for_sleep
    }

    pub fn stats(&self) -> BreakStats {
        self.stats
    }

    pub fn time_string(&self) -> String {
        time_string(self.remaining_secs)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            phase: self.phase,
            status: self.phase.label().to_string(),
            remaining_secs: self.remaining_secs,
            time_string: self.time_string(),
            ticking: self.ticking,
            auto_paused_for_sleep: self.auto_paused_for_sleep,
            stats: self.stats,
        }
    }

    /// Receive every event produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance one second. Returns an event when the countdown ran out.
    pub fn tick(&mut self) -> Option<Event> {
        let settings = self.settings.current();
        if !settings.app_enabled || !self.ticking {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let event = match self.phase {
            Phase::Working => self.start_break(&settings),
            Phase::Breaking => self.end_break(BreakOutcome::Taken, &settings),
            Phase::PausedTimed | Phase::PausedIndefinite => self.begin_work(&settings),
        };
        self.publish(event)
    }

    /// End the current break early. No-op in strict mode or outside a break.
    pub fn skip_break(&mut self) -> Option<Event> {
        let settings = self.settings.current();
        if settings.strict_mode || self.phase != Phase::Breaking {
            return None;
        }
        let event = self.end_break(BreakOutcome::Skipped, &settings);
        self.publish(event)
    }

    /// Finish the current break now, counting it as taken.
    pub fn complete_break(&mut self) -> Option<Event> {
        if self.phase != Phase::Breaking {
            return None;
        }
        let settings = self.settings.current();
        let event = self.end_break(BreakOutcome::Taken, &settings);
        self.publish(event)
    }

    /// Put the current break off for `minutes`. No-op in strict mode or
    /// outside a break.
    pub fn snooze_break(&mut self, minutes: u64) -> Option<Event> {
        let settings = self.settings.current();
        if settings.strict_mode || self.phase != Phase::Breaking {
            return None;
        }
        self.enter_timed_pause(minutes);
        self.publish(Event::BreakSnoozed {
            minutes,
            at: Utc::now(),
        })
    }

    /// Pause for `minutes`, then start a fresh work interval.
    pub fn pause_app(&mut self, minutes: u64) -> Option<Event> {
        let duration_secs = self.enter_timed_pause(minutes);
        info!(minutes, "paused");
        self.publish(Event::Paused {
            reason: PauseReason::User,
            duration_secs: Some(duration_secs),
            at: Utc::now(),
        })
    }

    pub fn pause_indefinitely(&mut self) -> Option<Event> {
        self.enter_indefinite_pause(false);
        info!("paused indefinitely");
        self.publish(Event::Paused {
            reason: PauseReason::User,
            duration_secs: None,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self, request: PauseRequest) -> Option<Event> {
        match request {
            PauseRequest::For { minutes } => self.pause_app(minutes),
            PauseRequest::Indefinitely => self.pause_indefinitely(),
        }
    }

    /// Leave a pause for a fresh work interval. No-op when not paused.
    pub fn resume(&mut self) -> Option<Event> {
        if !self.phase.is_paused() {
            return None;
        }
        let settings = self.settings.current();
        let event = self.begin_work(&settings);
        info!(remaining_secs = self.remaining_secs, "resumed");
        self.publish(event)
    }

    /// The machine is going to sleep. Ignored if already paused, so
    /// repeated notifications are harmless.
    pub fn handle_system_sleep(&mut self) -> Option<Event> {
        if self.phase.is_paused() {
            return None;
        }
        self.enter_indefinite_pause(true);
        info!("paused for system sleep");
        self.publish(Event::Paused {
            reason: PauseReason::Sleep,
            duration_secs: None,
            at: Utc::now(),
        })
    }

    /// The machine woke up. Resumes only a pause that sleep started.
    pub fn handle_system_wake(&mut self) -> Option<Event> {
        if !self.auto_paused_for_sleep || self.phase != Phase::PausedIndefinite {
            return None;
        }
        self.resume()
    }

    /// Back to a fresh work interval from any phase.
    pub fn reset_timer(&mut self) -> Option<Event> {
        let settings = self.settings.current();
        let was_breaking = self.phase == Phase::Breaking;
        self.phase = Phase::Working;
        self.remaining_secs = settings.work_interval_secs;
        self.auto_paused_for_sleep = false;
        self.ticking = true;
        if was_breaking {
            self.dispatcher.hide_reminder();
        }
        info!(remaining_secs = self.remaining_secs, "timer reset");
        self.publish(Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Re-read settings after the host changed them.
    ///
    /// Working and breaking phases restart their countdown from the new
    /// interval, and a break shows its reminder again. Pauses are left alone. Disabling the app freezes the
    /// countdown and hides the reminder without changing phase.
    pub fn settings_changed(&mut self) -> Option<Event> {
        let settings = self.settings.current();
        if !settings.app_enabled {
            self.ticking = false;
            self.dispatcher.hide_reminder();
            info!(phase = %self.phase, "app disabled");
            return self.publish(Event::Disabled { at: Utc::now() });
        }

        match self.phase {
            Phase::Working => {
                self.remaining_secs = settings.work_interval_secs;
                self.ticking = true;
            }
            Phase::Breaking => {
                self.remaining_secs = settings.break_interval_secs;
                self.ticking = true;
                // Disabling hid the reminder; a running break is always on screen.
                if let Some(reminder) = Reminder::for_break(&settings, self.remaining_secs) {
                    self.dispatcher.show_reminder(&reminder);
                }
            }
            Phase::PausedTimed => self.ticking = true,
            Phase::PausedIndefinite => {}
        }
        self.publish(Event::SettingsApplied {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_break(&mut self, settings: &Settings) -> Event {
        self.phase = Phase::Breaking;
        self.remaining_secs = settings.break_interval_secs;
        self.ticking = true;
        self.auto_paused_for_sleep = false;
        dispatch_break_start(self.dispatcher.as_ref(), settings, self.remaining_secs);
        Event::BreakStarted {
            duration_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// The one place a break ends and the counters move.
    fn end_break(&mut self, outcome: BreakOutcome, settings: &Settings) -> Event {
        match outcome {
            BreakOutcome::Taken => self.stats.breaks_taken += 1,
            BreakOutcome::Skipped => self.stats.breaks_skipped += 1,
        }
        self.phase = Phase::Working;
        self.remaining_secs = settings.work_interval_secs;
        self.ticking = true;
        self.auto_paused_for_sleep = false;
        if settings.app_enabled {
            dispatch_break_end(self.dispatcher.as_ref(), settings);
        } else {
            // Disabled app: no sound or haptic, the reminder is already gone.
            self.dispatcher.hide_reminder();
        }
        Event::BreakEnded {
            outcome,
            at: Utc::now(),
        }
    }

    fn begin_work(&mut self, settings: &Settings) -> Event {
        self.phase = Phase::Working;
        self.remaining_secs = settings.work_interval_secs;
        self.ticking = true;
        self.auto_paused_for_sleep = false;
        Event::Resumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    fn enter_timed_pause(&mut self, minutes: u64) -> u64 {
        self.phase = Phase::PausedTimed;
        self.remaining_secs = minutes.saturating_mul(60);
        self.ticking = true;
        self.auto_paused_for_sleep = false;
        self.dispatcher.hide_reminder();
        self.remaining_secs
    }

    fn enter_indefinite_pause(&mut self, for_sleep: bool) {
        self.phase = Phase::PausedIndefinite;
        self.ticking = false;
        self.auto_paused_for_sleep = for_sleep;
        self.dispatcher.hide_reminder();
    }

    fn publish(&self, event: Event) -> Option<Event> {
        debug!(
            event = event.kind(),
            phase = %self.phase,
            remaining_secs = self.remaining_secs,
            "scheduler transition"
        );
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::status_line;
    use crate::storage::SharedSettings;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Spy(Mutex<Vec<String>>);

    impl Spy {
        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.0.lock().unwrap().clear();
        }
    }

    impl EffectDispatcher for Spy {
        fn play_sound(&self, name: &str) {
            self.0.lock().unwrap().push(format!("sound:{name}"));
        }
        fn trigger_haptic(&self) {
            self.0.lock().unwrap().push("haptic".into());
        }
        fn show_reminder(&self, _reminder: &Reminder) {
            self.0.lock().unwrap().push("show".into());
        }
        fn hide_reminder(&self) {
            self.0.lock().unwrap().push("hide".into());
        }
    }

    fn scheduler(work: u64, brk: u64) -> (IntervalScheduler, SharedSettings, Arc<Spy>) {
        let settings = SharedSettings::new(Settings::with_intervals(work, brk));
        let spy = Arc::new(Spy::default());
        let scheduler = IntervalScheduler::new(settings.clone(), spy.clone());
        (scheduler, settings, spy)
    }

    fn into_break(s: &mut IntervalScheduler) {
        while s.phase() != Phase::Breaking {
            s.tick();
        }
    }

    #[test]
    fn starts_working_with_full_interval() {
        let (s, _, spy) = scheduler(1200, 20);
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1200);
        assert!(s.is_ticking());
        assert!(!s.is_auto_paused_for_sleep());
        assert_eq!(s.stats(), BreakStats::default());
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn plain_tick_only_decrements() {
        let (mut s, _, spy) = scheduler(10, 5);
        assert!(s.tick().is_none());
        assert_eq!(s.remaining_secs(), 9);
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn work_expiry_starts_break_with_effects_in_order() {
        let (mut s, _, spy) = scheduler(2, 7);
        s.tick();
        let event = s.tick();
        assert!(matches!(event, Some(Event::BreakStarted { duration_secs: 7, .. })));
        assert_eq!(s.phase(), Phase::Breaking);
        assert_eq!(s.remaining_secs(), 7);
        assert_eq!(spy.calls(), ["sound:Glass", "haptic", "show"]);
    }

    #[test]
    fn break_expiry_counts_taken_and_hides() {
        let (mut s, _, spy) = scheduler(1, 2);
        into_break(&mut s);
        spy.clear();
        s.tick();
        let event = s.tick();
        assert!(matches!(
            event,
            Some(Event::BreakEnded { outcome: BreakOutcome::Taken, .. })
        ));
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1);
        assert_eq!(s.stats().breaks_taken, 1);
        assert_eq!(s.stats().breaks_skipped, 0);
        assert_eq!(spy.calls(), ["sound:Glass", "haptic", "hide"]);
    }

    #[test]
    fn skip_during_break_counts_skipped_only() {
        let (mut s, _, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();
        let event = s.skip_break();
        assert!(matches!(
            event,
            Some(Event::BreakEnded { outcome: BreakOutcome::Skipped, .. })
        ));
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1);
        assert_eq!(s.stats().breaks_skipped, 1);
        assert_eq!(s.stats().breaks_taken, 0);
        assert_eq!(spy.calls(), ["sound:Glass", "haptic", "hide"]);
    }

    #[test]
    fn skip_while_working_is_noop() {
        let (mut s, _, spy) = scheduler(100, 20);
        assert!(s.skip_break().is_none());
        assert!(s.complete_break().is_none());
        assert!(s.snooze_break(5).is_none());
        assert_eq!(s.stats(), BreakStats::default());
        assert_eq!(s.remaining_secs(), 100);
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn complete_break_fires_end_effects_once() {
        let (mut s, _, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();
        assert!(s.complete_break().is_some());
        assert!(s.complete_break().is_none());
        assert_eq!(s.stats().breaks_taken, 1);
        assert_eq!(spy.calls(), ["sound:Glass", "haptic", "hide"]);
    }

    #[test]
    fn snooze_moves_to_timed_pause() {
        let (mut s, _, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();
        assert!(s.snooze_break(5).is_some());
        assert_eq!(s.phase(), Phase::PausedTimed);
        assert_eq!(s.remaining_secs(), 300);
        assert!(s.is_ticking());
        assert_eq!(spy.calls(), ["hide"]);
        assert_eq!(s.stats(), BreakStats::default());
    }

    #[test]
    fn strict_mode_blocks_skip_and_snooze_but_not_complete() {
        let (mut s, settings, _) = scheduler(1, 20);
        settings.update(|s| s.strict_mode = true);
        into_break(&mut s);
        assert!(s.skip_break().is_none());
        assert!(s.snooze_break(5).is_none());
        assert_eq!(s.phase(), Phase::Breaking);
        assert_eq!(s.remaining_secs(), 20);
        assert!(s.complete_break().is_some());
        assert_eq!(s.stats().breaks_taken, 1);
    }

    #[test]
    fn timed_pause_returns_to_work_not_break() {
        let (mut s, _, spy) = scheduler(50, 20);
        s.pause_app(1);
        assert_eq!(s.phase(), Phase::PausedTimed);
        assert_eq!(s.remaining_secs(), 60);
        for _ in 0..59 {
            assert!(s.tick().is_none());
        }
        assert!(matches!(s.tick(), Some(Event::Resumed { remaining_secs: 50, .. })));
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(spy.calls(), ["hide"]);
    }

    #[test]
    fn pause_during_break_routes_through_fresh_work() {
        let (mut s, _, _) = scheduler(1, 20);
        into_break(&mut s);
        s.pause_app(0);
        assert_eq!(s.remaining_secs(), 0);
        s.tick();
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1);
        assert_eq!(s.stats(), BreakStats::default());
    }

    #[test]
    fn indefinite_pause_stops_countdown_until_resume() {
        let (mut s, _, _) = scheduler(30, 20);
        s.tick();
        s.pause_indefinitely();
        assert_eq!(s.phase(), Phase::PausedIndefinite);
        assert!(!s.is_ticking());
        let before = s.remaining_secs();
        for _ in 0..100 {
            assert!(s.tick().is_none());
        }
        assert_eq!(s.remaining_secs(), before);

        assert!(s.resume().is_some());
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 30);
        assert!(s.is_ticking());
    }

    #[test]
    fn resume_when_not_paused_is_noop() {
        let (mut s, _, _) = scheduler(30, 20);
        s.tick();
        assert!(s.resume().is_none());
        assert_eq!(s.remaining_secs(), 29);
    }

    #[test]
    fn pause_request_dispatches_to_the_right_pause() {
        let (mut s, _, _) = scheduler(30, 20);
        s.pause(PauseRequest::from_minutes(15));
        assert_eq!(s.phase(), Phase::PausedTimed);
        assert_eq!(s.remaining_secs(), 900);
        s.pause(PauseRequest::from_minutes(9999));
        assert_eq!(s.phase(), Phase::PausedIndefinite);
    }

    #[test]
    fn sleep_then_wake_resumes() {
        let (mut s, _, spy) = scheduler(30, 20);
        s.tick();
        assert!(s.handle_system_sleep().is_some());
        assert_eq!(s.phase(), Phase::PausedIndefinite);
        assert!(s.is_auto_paused_for_sleep());
        assert!(!s.is_ticking());
        assert_eq!(spy.calls(), ["hide"]);

        assert!(s.handle_system_wake().is_some());
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 30);
        assert!(!s.is_auto_paused_for_sleep());
    }

    #[test]
    fn sleep_is_idempotent() {
        let (mut s, _, spy) = scheduler(30, 20);
        s.handle_system_sleep();
        let first = s.snapshot();
        assert!(s.handle_system_sleep().is_none());
        assert_eq!(s.snapshot(), first);
        assert_eq!(spy.calls(), ["hide"]);
    }

    #[test]
    fn sleep_does_not_override_user_pause() {
        let (mut s, _, _) = scheduler(30, 20);
        s.pause_indefinitely();
        assert!(s.handle_system_sleep().is_none());
        assert!(!s.is_auto_paused_for_sleep());
        assert!(s.handle_system_wake().is_none());
        assert_eq!(s.phase(), Phase::PausedIndefinite);
    }

    #[test]
    fn wake_without_sleep_is_noop() {
        let (mut s, _, _) = scheduler(30, 20);
        s.tick();
        assert!(s.handle_system_wake().is_none());
        assert_eq!(s.remaining_secs(), 29);
    }

    #[test]
    fn user_pause_after_sleep_clears_sleep_flag() {
        let (mut s, _, _) = scheduler(30, 20);
        s.handle_system_sleep();
        s.pause_indefinitely();
        assert!(!s.is_auto_paused_for_sleep());
        assert!(s.handle_system_wake().is_none());
    }

    #[test]
    fn reset_from_break_returns_to_work_and_hides() {
        let (mut s, _, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();
        assert!(s.reset_timer().is_some());
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1);
        assert!(s.is_ticking());
        assert_eq!(spy.calls(), ["hide"]);
        assert_eq!(s.stats(), BreakStats::default());
    }

    #[test]
    fn reset_from_indefinite_pause_restarts_countdown() {
        let (mut s, _, spy) = scheduler(40, 20);
        s.pause_indefinitely();
        spy.clear();
        s.reset_timer();
        assert_eq!(s.phase(), Phase::Working);
        assert!(s.is_ticking());
        assert_eq!(s.remaining_secs(), 40);
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn disabled_app_freezes_ticks() {
        let (mut s, settings, _) = scheduler(30, 20);
        s.tick();
        settings.update(|s| s.app_enabled = false);
        for _ in 0..50 {
            assert!(s.tick().is_none());
        }
        assert_eq!(s.remaining_secs(), 29);
        assert_eq!(s.phase(), Phase::Working);
    }

    #[test]
    fn settings_changed_rederives_interval_for_current_phase() {
        let (mut s, settings, _) = scheduler(1, 20);
        into_break(&mut s);
        s.tick();
        settings.update(|s| s.break_interval_secs = 45);
        assert!(s.settings_changed().is_some());
        assert_eq!(s.phase(), Phase::Breaking);
        assert_eq!(s.remaining_secs(), 45);

        s.complete_break();
        settings.update(|s| s.work_interval_secs = 600);
        s.settings_changed();
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 600);
    }

    #[test]
    fn settings_changed_keeps_user_pause() {
        let (mut s, settings, _) = scheduler(30, 20);
        s.pause_app(2);
        s.tick();
        settings.update(|s| s.work_interval_secs = 99);
        s.settings_changed();
        assert_eq!(s.phase(), Phase::PausedTimed);
        assert_eq!(s.remaining_secs(), 119);
    }

    #[test]
    fn disabling_stops_countdown_and_hides_reminder() {
        let (mut s, settings, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();
        settings.update(|s| s.app_enabled = false);
        assert!(matches!(s.settings_changed(), Some(Event::Disabled { .. })));
        assert_eq!(s.phase(), Phase::Breaking);
        assert!(!s.is_ticking());
        assert_eq!(spy.calls(), ["hide"]);

        settings.update(|s| s.app_enabled = true);
        s.settings_changed();
        assert!(s.is_ticking());
        assert_eq!(s.remaining_secs(), 20);
    }

    #[test]
    fn reenabling_during_break_shows_reminder_again() {
        let (mut s, settings, spy) = scheduler(1, 3);
        into_break(&mut s);
        settings.update(|s| s.app_enabled = false);
        s.settings_changed();
        settings.update(|s| s.app_enabled = true);
        spy.clear();

        s.settings_changed();
        assert_eq!(spy.calls(), ["show"]);
        assert_eq!(s.phase(), Phase::Breaking);
        assert_eq!(s.remaining_secs(), 3);

        for _ in 0..3 {
            s.tick();
        }
        assert_eq!(spy.calls(), ["show", "sound:Glass", "haptic", "hide"]);
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.stats().breaks_taken, 1);
    }

    #[test]
    fn ending_break_while_disabled_is_silent() {
        let (mut s, settings, spy) = scheduler(1, 20);
        into_break(&mut s);
        settings.update(|s| s.app_enabled = false);
        s.settings_changed();
        spy.clear();

        assert!(s.skip_break().is_some());
        assert_eq!(spy.calls(), ["hide"]);
        assert_eq!(s.stats().breaks_skipped, 1);
        assert_eq!(s.phase(), Phase::Working);
    }

    #[test]
    fn sleep_during_break_drops_it_uncounted() {
        let (mut s, _, spy) = scheduler(1, 20);
        into_break(&mut s);
        spy.clear();

        assert!(s.handle_system_sleep().is_some());
        assert_eq!(s.phase(), Phase::PausedIndefinite);
        assert_eq!(spy.calls(), ["hide"]);

        assert!(s.handle_system_wake().is_some());
        assert_eq!(s.phase(), Phase::Working);
        assert_eq!(s.remaining_secs(), 1);
        assert_eq!(s.stats(), BreakStats::default());
        assert_eq!(spy.calls(), ["hide"]);
    }

    #[test]
    fn second_wake_is_noop() {
        let (mut s, _, _) = scheduler(30, 20);
        s.handle_system_sleep();
        assert!(s.handle_system_wake().is_some());
        s.tick();
        let after_first = s.snapshot();
        assert!(s.handle_system_wake().is_none());
        assert_eq!(s.snapshot(), after_first);
        assert_eq!(after_first.remaining_secs, 29);
    }

    #[test]
    fn reenabling_leaves_indefinite_pause_alone() {
        let (mut s, settings, spy) = scheduler(30, 20);
        s.pause_indefinitely();
        settings.update(|s| s.app_enabled = false);
        s.settings_changed();
        settings.update(|s| s.app_enabled = true);
        spy.clear();

        assert!(matches!(
            s.settings_changed(),
            Some(Event::SettingsApplied { phase: Phase::PausedIndefinite, .. })
        ));
        assert_eq!(s.phase(), Phase::PausedIndefinite);
        assert!(!s.is_ticking());
        assert!(s.tick().is_none());
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn reenabling_resumes_timed_pause_countdown() {
        let (mut s, settings, spy) = scheduler(30, 20);
        s.pause_app(1);
        s.tick();
        settings.update(|s| s.app_enabled = false);
        s.settings_changed();
        assert!(!s.is_ticking());
        settings.update(|s| s.app_enabled = true);
        spy.clear();

        s.settings_changed();
        assert_eq!(s.phase(), Phase::PausedTimed);
        assert!(s.is_ticking());
        assert_eq!(s.remaining_secs(), 59);
        s.tick();
        assert_eq!(s.remaining_secs(), 58);
        assert!(spy.calls().is_empty());
    }

    #[test]
    fn seeded_stats_accumulate() {
        let (s, _, _) = scheduler(1, 1);
        let mut s = s.with_stats(BreakStats {
            breaks_taken: 10,
            breaks_skipped: 3,
        });
        into_break(&mut s);
        s.skip_break();
        assert_eq!(s.stats().breaks_taken, 10);
        assert_eq!(s.stats().breaks_skipped, 4);
    }

    #[test]
    fn subscribers_see_each_transition_once() {
        let (mut s, _, _) = scheduler(1, 1);
        let mut rx = s.subscribe();
        s.tick();
        s.tick();
        s.skip_break();
        assert!(matches!(rx.try_recv(), Ok(Event::BreakStarted { .. })));
        assert!(matches!(
            rx.try_recv(),
            Ok(Event::BreakEnded { outcome: BreakOutcome::Taken, .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn snapshot_and_status_line_follow_phase() {
        let (mut s, _, _) = scheduler(1200, 20);
        let snap = s.snapshot();
        assert_eq!(snap.status, "ACTIVE");
        assert_eq!(snap.time_string, "20:00");
        assert_eq!(status_line(&snap), "Next break in 20:00");

        s.pause_app(5);
        assert_eq!(status_line(&s.snapshot()), "Resumes in 05:00");
        s.pause_indefinitely();
        assert_eq!(s.snapshot().status, "PAUSED");
        assert_eq!(status_line(&s.snapshot()), "Paused indefinitely");
    }
}
