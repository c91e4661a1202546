//! # Upkeep Schedule
//!
//! Translates declarative per-task schedule specifications into 5-field
//! cron expressions, and runs the compiled directives on a tick loop.

mod compiler;
mod error;
mod runner;
mod spec;

pub use compiler::compile;
pub use error::ScheduleError;
pub use runner::{to_cron_schedule, ScheduledTask, TaskRunner, TaskScheduler};
pub use spec::{CompiledDirective, Frequency, ScheduleSpec};
