//! Scheduler runner: registers compiled directives and fires due tasks.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::spec::CompiledDirective;

/// Day-of-week names accepted by the `cron` crate, Sunday first.
const DOW_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Invoked by the scheduler when a directive fires.
///
/// Implementations look up the named task and execute it; a returned error
/// is recorded on the scheduled task and does not stop the scheduler.
#[async_trait::async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run the task registered under `task_id`.
    async fn run_task(&self, task_id: &str) -> Result<(), ScheduleError>;
}

/// A directive registered with the scheduler, plus its run state.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    /// Registration id for this scheduler instance.
    pub instance_id: Uuid,

    /// The compiled directive.
    pub directive: CompiledDirective,

    /// Evaluated schedule.
    schedule: Schedule,

    /// Next fire time.
    pub next_run: Option<DateTime<Utc>>,

    /// Last fire time.
    pub last_run: Option<DateTime<Utc>>,

    /// Number of fires so far.
    pub run_count: u64,

    /// Error message from the last fire, if it failed.
    pub last_error: Option<String>,
}

/// Fires registered directives through a [`TaskRunner`] on a tick loop.
///
/// The scheduler checks for due tasks once per tick (default 60 seconds)
/// and runs until the cancellation channel flips.
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
    runner: Arc<dyn TaskRunner>,
    tick_interval: Duration,
}

impl TaskScheduler {
    /// Create a scheduler with the default 60 second tick.
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            tasks: Vec::new(),
            runner,
            tick_interval: Duration::from_secs(60),
        }
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Register a single directive.
    pub fn register(&mut self, directive: CompiledDirective) -> Result<(), ScheduleError> {
        let schedule = to_cron_schedule(&directive.cron_expression)?;
        let next_run = schedule.upcoming(Utc).next();
        let instance_id = Uuid::new_v4();

        info!(
            task_id = %directive.task_id,
            cron = %directive.cron_expression,
            %instance_id,
            "Registered scheduled task"
        );

        self.tasks.push(ScheduledTask {
            instance_id,
            directive,
            schedule,
            next_run,
            last_run: None,
            run_count: 0,
            last_error: None,
        });
        Ok(())
    }

    /// Register a batch of directives, skipping any whose expression cannot
    /// be evaluated. A bad custom cron disables that one task, never the
    /// whole scheduler.
    pub fn register_all(&mut self, directives: Vec<CompiledDirective>) {
        for directive in directives {
            let task_id = directive.task_id.clone();
            if let Err(e) = self.register(directive) {
                warn!("Skipping schedule for '{task_id}': {e}");
            }
        }
    }

    /// Registered tasks and their run state.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Run the scheduler loop until the cancellation channel flips.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!(
            "Scheduler started ({} tasks, tick {:?})",
            self.tasks.len(),
            self.tick_interval
        );

        let mut interval = time::interval(self.tick_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.fire_due_tasks().await;
                }
                _ = cancel.changed() => {
                    info!("Scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// Fire every task whose next run time has passed.
    async fn fire_due_tasks(&mut self) {
        let now = Utc::now();
        let runner = self.runner.clone();

        for task in &mut self.tasks {
            let due = matches!(task.next_run, Some(next) if next <= now);
            if !due {
                continue;
            }

            let task_id = task.directive.task_id.clone();
            debug!(%task_id, run_count = task.run_count, "Task due");

            match runner.run_task(&task_id).await {
                Ok(()) => {
                    info!(%task_id, "Scheduled task completed");
                    task.last_error = None;
                }
                Err(e) => {
                    error!(%task_id, "Scheduled task failed: {e}");
                    task.last_error = Some(e.to_string());
                }
            }

            task.last_run = Some(now);
            task.run_count += 1;
            task.next_run = task.schedule.upcoming(Utc).next();
        }
    }
}

/// Adapt a standard 5-field cron expression for the `cron` crate.
///
/// The crate expects a seconds field and Sunday-first 1-7 day-of-week
/// ordinals, so a zero seconds field is prepended and numeric day-of-week
/// tokens are rewritten as names (`0` and `7` both meaning Sunday).
pub fn to_cron_schedule(expression: &str) -> Result<Schedule, ScheduleError> {
    let invalid = |reason: String| ScheduleError::InvalidCron {
        expr: expression.to_string(),
        reason,
    };

    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(invalid(format!("expected 5 fields, got {}", fields.len())));
    }

    let day_of_week = rewrite_day_of_week(fields[4]).map_err(&invalid)?;
    let six_field = format!(
        "0 {} {} {} {} {}",
        fields[0], fields[1], fields[2], fields[3], day_of_week
    );

    Schedule::from_str(&six_field).map_err(|e| invalid(e.to_string()))
}

/// Rewrite numeric day-of-week values as names, preserving lists, ranges,
/// steps, and values that are already names.
fn rewrite_day_of_week(field: &str) -> Result<String, String> {
    let parts: Result<Vec<String>, String> = field.split(',').map(rewrite_dow_part).collect();
    Ok(parts?.join(","))
}

fn rewrite_dow_part(part: &str) -> Result<String, String> {
    let (range, step) = match part.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (part, None),
    };

    let rewritten = if range == "*" {
        "*".to_string()
    } else if let Some((start, end)) = range.split_once('-') {
        format!("{}-{}", rewrite_dow_value(start)?, rewrite_dow_value(end)?)
    } else {
        rewrite_dow_value(range)?
    };

    Ok(match step {
        Some(step) => format!("{rewritten}/{step}"),
        None => rewritten,
    })
}

fn rewrite_dow_value(value: &str) -> Result<String, String> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        let n: usize = value
            .parse()
            .map_err(|_| format!("invalid day-of-week value '{value}'"))?;
        if n > 7 {
            return Err(format!("day-of-week value {n} out of range"));
        }
        Ok(DOW_NAMES[n % 7].to_string())
    } else {
        // Already a name; the cron parser validates it.
        Ok(value.to_string())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
