//! `starepatrol run`: drive the scheduler from a one-second ticker.
//!
//! Events go to stdout as JSON lines, reminders and logs go to stderr.
//! Commands are read line by line from stdin (see `control::HELP`).

use chrono::{DateTime, Utc};
use clap::Args;
use starepatrol_core::storage::MIN_INTERVAL_SECS;
use starepatrol_core::{
    Config, Database, Event, IntervalScheduler, Settings, SharedScheduler, SharedSettings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};

use crate::control::{ControlCommand, HELP};
use crate::effects::TerminalDispatcher;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Override the work interval, in seconds
    #[arg(long)]
    pub work_seconds: Option<u64>,
    /// Override the break interval, in seconds
    #[arg(long)]
    pub break_seconds: Option<u64>,
    /// Wall-clock jump between two ticks that counts as a system sleep
    #[arg(long, default_value_t = 5)]
    pub sleep_gap_secs: u64,
    /// Don't record breaks in the history database
    #[arg(long)]
    pub no_history: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(args));
    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Settings from the config file with command-line overrides applied.
pub fn effective_settings(config: &Config, args: &RunArgs) -> Settings {
    let mut settings = config.settings();
    if let Some(secs) = args.work_seconds {
        settings.work_interval_secs = secs.max(MIN_INTERVAL_SECS);
    }
    if let Some(secs) = args.break_seconds {
        settings.break_interval_secs = secs.max(MIN_INTERVAL_SECS);
    }
    settings
}

async fn drive(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let settings = SharedSettings::new(effective_settings(&config, &args));

    let db = if args.no_history {
        None
    } else {
        match Database::open() {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("break history disabled: {e}");
                None
            }
        }
    };
    let seed = db
        .as_ref()
        .and_then(|db| db.stats_all().ok())
        .unwrap_or_default();

    let (dispatcher, effects_worker) = TerminalDispatcher::spawn();
    let scheduler = SharedScheduler::new(
        IntervalScheduler::new(settings.clone(), dispatcher).with_stats(seed),
    );
    let recorder = db.map(|db| spawn_history_recorder(scheduler.subscribe(), db));

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut sleep_detector = SleepDetector::new(Utc::now(), args.sleep_gap_secs);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let snapshot = scheduler.snapshot();
    tracing::info!(
        phase = %snapshot.phase,
        remaining = snapshot.remaining_secs,
        "starepatrol running"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if sleep_detector.observe(Utc::now()) {
                    tracing::info!("wall clock jumped, treating the gap as a system sleep");
                    emit(scheduler.handle_system_sleep());
                    emit(scheduler.handle_system_wake());
                    continue;
                }
                emit(scheduler.tick());
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<ControlCommand>() {
                        Ok(ControlCommand::Quit) => break,
                        Ok(cmd) => apply(&scheduler, &settings, &args, cmd)?,
                        Err(msg) => eprintln!("{msg}\n{HELP}"),
                    },
                    Ok(None) => {
                        tracing::debug!("stdin closed, running without commands");
                        stdin_open = false;
                    }
                    Err(e) => {
                        tracing::warn!("failed to read stdin: {e}");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    // Dropping the last scheduler handle closes the event and effect channels.
    drop(scheduler);
    if let Some(recorder) = recorder {
        if let Err(e) = recorder.await {
            tracing::warn!("history recorder failed: {e}");
        }
    }
    if let Err(e) = effects_worker.await {
        tracing::warn!("effect worker failed: {e}");
    }
    tracing::info!("starepatrol stopped");
    Ok(())
}

fn apply(
    scheduler: &SharedScheduler,
    settings: &SharedSettings,
    args: &RunArgs,
    cmd: ControlCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = match cmd {
        ControlCommand::Status => {
            println!("{}", serde_json::to_string(&scheduler.snapshot())?);
            None
        }
        ControlCommand::Skip => scheduler.skip_break(),
        ControlCommand::Snooze { minutes } => scheduler.snooze_break(minutes),
        ControlCommand::Complete => scheduler.complete_break(),
        ControlCommand::Pause(request) => scheduler.pause(request),
        ControlCommand::Resume => scheduler.resume(),
        ControlCommand::Reset => scheduler.reset_timer(),
        ControlCommand::Reload => match Config::load() {
            // Swap and re-derive under one lock so no tick sees half of it.
            Ok(config) => scheduler.with(|s| {
                settings.replace(effective_settings(&config, args));
                s.settings_changed()
            }),
            Err(e) => {
                eprintln!("reload failed: {e}");
                None
            }
        },
        ControlCommand::Sleep => scheduler.handle_system_sleep(),
        ControlCommand::Wake => scheduler.handle_system_wake(),
        ControlCommand::Help => {
            eprintln!("{HELP}");
            None
        }
        ControlCommand::Quit => None,
    };
    emit(event);
    Ok(())
}

fn emit(event: Option<Event>) {
    let Some(event) = event else { return };
    match serde_json::to_string(&event) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(kind = event.kind(), "failed to serialize event: {e}"),
    }
}

/// Writes every finished break to the history database.
///
/// Runs on the blocking pool since the connection is synchronous. Ends when
/// the scheduler, and with it the event sender, is dropped.
fn spawn_history_recorder(mut rx: broadcast::Receiver<Event>, db: Database) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut started_at: Option<DateTime<Utc>> = None;
        loop {
            match rx.blocking_recv() {
                Ok(Event::BreakStarted { at, .. }) => started_at = Some(at),
                Ok(Event::BreakEnded { outcome, at }) => {
                    let duration_secs = break_duration(started_at.take(), at);
                    if let Err(e) = db.record_break(outcome, duration_secs, at) {
                        tracing::error!(outcome = outcome.as_str(), "failed to record break: {e}");
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "history recorder fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn break_duration(started_at: Option<DateTime<Utc>>, ended_at: DateTime<Utc>) -> u64 {
    started_at
        .map(|start| (ended_at - start).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

/// Spots suspend/resume by the wall clock jumping between two ticks.
#[derive(Debug)]
pub struct SleepDetector {
    last: DateTime<Utc>,
    gap: chrono::Duration,
}

impl SleepDetector {
    pub fn new(now: DateTime<Utc>, gap_secs: u64) -> Self {
        Self {
            last: now,
            gap: chrono::Duration::seconds(i64::try_from(gap_secs).unwrap_or(i64::MAX)),
        }
    }

    /// Record a tick at `now`. True if the time since the last tick is at
    /// least the configured gap.
    pub fn observe(&mut self, now: DateTime<Utc>) -> bool {
        let elapsed = now - self.last;
        self.last = now;
        elapsed >= self.gap
    }
}
