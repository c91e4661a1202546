use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use chrono::{Datelike, Timelike, Weekday};

struct RecordingRunner {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingRunner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }
}

#[async_trait::async_trait]
impl TaskRunner for RecordingRunner {
    async fn run_task(&self, task_id: &str) -> Result<(), ScheduleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ScheduleError::RunFailed(format!("task '{task_id}' broke")))
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_weekly_monday_fires_on_mondays() {
    let schedule = to_cron_schedule("0 1 * * 1").unwrap();
    for fire in schedule.upcoming(Utc).take(3) {
        assert_eq!(fire.weekday(), Weekday::Mon);
        assert_eq!(fire.hour(), 1);
        assert_eq!(fire.minute(), 0);
    }
}

#[test]
fn test_day_list_fires_on_both_days() {
    let schedule = to_cron_schedule("0 4 * * 1,4").unwrap();
    let weekdays: Vec<Weekday> = schedule
        .upcoming(Utc)
        .take(4)
        .map(|fire| fire.weekday())
        .collect();
    assert!(weekdays.contains(&Weekday::Mon));
    assert!(weekdays.contains(&Weekday::Thu));
    for day in weekdays {
        assert!(day == Weekday::Mon || day == Weekday::Thu);
    }
}

#[test]
fn test_daily_fires_every_day() {
    let schedule = to_cron_schedule("30 3 * * *").unwrap();
    let fires: Vec<_> = schedule.upcoming(Utc).take(2).collect();
    assert_eq!(fires[0].hour(), 3);
    assert_eq!(fires[0].minute(), 30);
    assert_eq!(fires[1] - fires[0], chrono::Duration::days(1));
}

#[test]
fn test_quarterly_fires_on_quarter_months() {
    let schedule = to_cron_schedule("0 0 1 1,4,7,10 *").unwrap();
    for fire in schedule.upcoming(Utc).take(4) {
        assert!(matches!(fire.month(), 1 | 4 | 7 | 10));
        assert_eq!(fire.day(), 1);
    }
}

#[test]
fn test_sunday_as_zero() {
    let schedule = to_cron_schedule("0 0 * * 0").unwrap();
    for fire in schedule.upcoming(Utc).take(2) {
        assert_eq!(fire.weekday(), Weekday::Sun);
    }
}

#[test]
fn test_sunday_as_seven() {
    let schedule = to_cron_schedule("0 0 * * 7").unwrap();
    for fire in schedule.upcoming(Utc).take(2) {
        assert_eq!(fire.weekday(), Weekday::Sun);
    }
}

#[test]
fn test_weekday_range() {
    let schedule = to_cron_schedule("0 9 * * 1-5").unwrap();
    for fire in schedule.upcoming(Utc).take(7) {
        assert!(fire.weekday() != Weekday::Sat && fire.weekday() != Weekday::Sun);
    }
}

#[test]
fn test_named_days_pass_through() {
    let schedule = to_cron_schedule("0 9 * * MON").unwrap();
    for fire in schedule.upcoming(Utc).take(2) {
        assert_eq!(fire.weekday(), Weekday::Mon);
    }
}

#[test]
fn test_rewrite_day_of_week() {
    assert_eq!(rewrite_day_of_week("*").unwrap(), "*");
    assert_eq!(rewrite_day_of_week("0").unwrap(), "SUN");
    assert_eq!(rewrite_day_of_week("7").unwrap(), "SUN");
    assert_eq!(rewrite_day_of_week("1,4").unwrap(), "MON,THU");
    assert_eq!(rewrite_day_of_week("1-5").unwrap(), "MON-FRI");
    assert_eq!(rewrite_day_of_week("*/2").unwrap(), "*/2");
    assert_eq!(rewrite_day_of_week("1-5/2").unwrap(), "MON-FRI/2");
    assert_eq!(rewrite_day_of_week("SAT").unwrap(), "SAT");
}

#[test]
fn test_invalid_field_count() {
    for expression in ["0 1 * *", "0 1 * * * *", ""] {
        let result = to_cron_schedule(expression);
        assert!(
            matches!(result, Err(ScheduleError::InvalidCron { .. })),
            "'{expression}' should be rejected"
        );
    }
}

#[test]
fn test_invalid_day_of_week_value() {
    assert!(to_cron_schedule("0 0 * * 9").is_err());
}

#[test]
fn test_garbage_expression() {
    assert!(to_cron_schedule("foo bar baz qux quux").is_err());
}

#[test]
fn test_register_directive() {
    let mut scheduler = TaskScheduler::new(RecordingRunner::new());
    scheduler
        .register(CompiledDirective::new("clean-temp", "0 1 * * 1"))
        .unwrap();

    let tasks = scheduler.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].directive.task_id, "clean-temp");
    assert_eq!(tasks[0].run_count, 0);
    assert!(tasks[0].next_run.is_some());
    assert!(tasks[0].next_run.unwrap() > Utc::now());
}

#[test]
fn test_register_all_skips_bad_expressions() {
    let mut scheduler = TaskScheduler::new(RecordingRunner::new());
    scheduler.register_all(vec![
        CompiledDirective::new("clean-temp", "0 1 * * 1"),
        CompiledDirective::new("broken", "not a cron expression"),
        CompiledDirective::new("clean-logs", "0 2 * * 1"),
    ]);

    let ids: Vec<_> = scheduler
        .tasks()
        .iter()
        .map(|task| task.directive.task_id.as_str())
        .collect();
    assert_eq!(ids, vec!["clean-temp", "clean-logs"]);
}

#[tokio::test]
async fn test_fire_due_task() {
    let runner = RecordingRunner::new();
    let mut scheduler = TaskScheduler::new(runner.clone());
    scheduler
        .register(CompiledDirective::new("clean-temp", "* * * * *"))
        .unwrap();

    // Force the task due and fire a tick by hand.
    scheduler.tasks[0].next_run = Some(Utc::now() - chrono::Duration::minutes(1));
    scheduler.fire_due_tasks().await;

    assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    let task = &scheduler.tasks()[0];
    assert_eq!(task.run_count, 1);
    assert!(task.last_run.is_some());
    assert!(task.last_error.is_none());
    assert!(task.next_run.unwrap() > Utc::now() - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn test_fire_records_failure() {
    let runner = RecordingRunner::failing();
    let mut scheduler = TaskScheduler::new(runner.clone());
    scheduler
        .register(CompiledDirective::new("clean-logs", "* * * * *"))
        .unwrap();

    scheduler.tasks[0].next_run = Some(Utc::now() - chrono::Duration::minutes(1));
    scheduler.fire_due_tasks().await;

    let task = &scheduler.tasks()[0];
    assert_eq!(task.run_count, 1);
    assert!(task.last_error.as_deref().unwrap().contains("clean-logs"));
}

#[tokio::test]
async fn test_task_not_due_is_not_fired() {
    let runner = RecordingRunner::new();
    let mut scheduler = TaskScheduler::new(runner.clone());
    scheduler
        .register(CompiledDirective::new("clean-temp", "0 1 * * 1"))
        .unwrap();

    scheduler.fire_due_tasks().await;
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.tasks()[0].run_count, 0);
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let scheduler = TaskScheduler::new(RecordingRunner::new())
        .with_tick_interval(Duration::from_millis(10));
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let handle = tokio::spawn(scheduler.run(cancel_rx));
    cancel_tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler should shut down promptly")
        .unwrap();
}
