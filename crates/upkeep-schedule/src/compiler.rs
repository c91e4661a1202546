//! Compiles declarative schedule specs into 5-field cron expressions.

use crate::error::ScheduleError;
use crate::spec::{CompiledDirective, Frequency, ScheduleSpec};

/// Weekday names recognized for weekly schedules, Sunday first so the index
/// matches the cron day-of-week field (0 = Sunday .. 6 = Saturday).
const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Compile a schedule spec into a directive for the given task.
///
/// Returns `Ok(None)` when the spec yields no schedule: the task is
/// disabled, the frequency is unrecognized, or `custom` carries no cron
/// expression. The only error is a malformed `time` value; everything else
/// is resolved by substituting defaults.
pub fn compile(
    task_id: &str,
    spec: &ScheduleSpec,
) -> Result<Option<CompiledDirective>, ScheduleError> {
    if !spec.enabled {
        return Ok(None);
    }

    let expression = match spec.frequency {
        Frequency::Daily => {
            let (hour, minute) = parse_time(&spec.time)?;
            format!("{minute} {hour} * * *")
        }
        Frequency::Weekly => {
            let (hour, minute) = parse_time(&spec.time)?;
            let day = weekday_number(spec.day.as_deref().unwrap_or("monday"));
            format!("{minute} {hour} * * {day}")
        }
        Frequency::Monthly => {
            let (hour, minute) = parse_time(&spec.time)?;
            format!("{minute} {hour} 1 * *")
        }
        Frequency::Quarterly => {
            let (hour, minute) = parse_time(&spec.time)?;
            format!("{minute} {hour} 1 1,4,7,10 *")
        }
        Frequency::Yearly => {
            let (hour, minute) = parse_time(&spec.time)?;
            format!("{minute} {hour} 1 1 *")
        }
        Frequency::Custom => match &spec.cron {
            Some(cron) => cron.clone(),
            None => return Ok(None),
        },
        Frequency::Unknown => return Ok(None),
    };

    Ok(Some(CompiledDirective::new(task_id, expression)))
}

/// Parse a `HH:MM` wall-clock string into `(hour, minute)`.
fn parse_time(time: &str) -> Result<(u32, u32), ScheduleError> {
    let invalid = || ScheduleError::InvalidTimeFormat(time.to_string());

    let (hour, minute) = time.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Resolve a weekday name to its cron index (Sunday = 0 .. Saturday = 6).
///
/// Matching is case-insensitive; unrecognized names resolve to Monday
/// rather than failing.
fn weekday_number(day: &str) -> u32 {
    let day = day.to_lowercase();
    WEEKDAYS
        .iter()
        .position(|name| *name == day)
        .map(|index| index as u32)
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
