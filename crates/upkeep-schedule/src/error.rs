//! Scheduling errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid time format: expected HH:MM, got '{0}'")]
    InvalidTimeFormat(String),

    #[error("Invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("Task run failed: {0}")]
    RunFailed(String),
}
