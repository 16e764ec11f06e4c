mod engine;
mod shared;
mod state;

pub use engine::IntervalScheduler;
pub use shared::SharedScheduler;
pub use state::{BreakStats, PauseRequest, Phase, SchedulerSnapshot};
