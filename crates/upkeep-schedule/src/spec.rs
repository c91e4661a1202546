//! Declarative schedule specification types.

use serde::{Deserialize, Serialize};

/// Recurrence category for a scheduled task.
///
/// Deserialization is lenient: any string other than the six recognized
/// lowercase names becomes [`Frequency::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Raw cron expression, taken from the `cron` field.
    Custom,
    /// Any unrecognized frequency string. Compiles to no directive.
    Unknown,
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            "quarterly" => Frequency::Quarterly,
            "yearly" => Frequency::Yearly,
            "custom" => Frequency::Custom,
            _ => Frequency::Unknown,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Weekly
    }
}

/// Declarative schedule for a single task.
///
/// Missing keys resolve to defaults rather than errors: an absent `enabled`
/// means the task is scheduled, an absent `frequency` means weekly, an
/// absent `time` means midnight. An explicit `enabled = false` always wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSpec {
    /// Whether the task should be scheduled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Recurrence category.
    #[serde(default)]
    pub frequency: Frequency,

    /// Wall-clock time of day, `HH:MM`, 24-hour. Used by every frequency
    /// except `custom`.
    #[serde(default = "default_time")]
    pub time: String,

    /// Weekday name, case-insensitive. Only used when `frequency` is
    /// `weekly`; unrecognized names resolve to Monday.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,

    /// Raw 5-field cron expression. Only used when `frequency` is `custom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_time() -> String {
    "00:00".to_string()
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            frequency: Frequency::default(),
            time: default_time(),
            day: None,
            cron: None,
        }
    }
}

/// A compiled, ready-to-register recurrence rule paired with a task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDirective {
    /// Task the directive fires.
    pub task_id: String,

    /// 5-field cron expression: `minute hour day-of-month month day-of-week`.
    pub cron_expression: String,
}

impl CompiledDirective {
    /// Create a new directive.
    pub fn new(task_id: impl Into<String>, cron_expression: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            cron_expression: cron_expression.into(),
        }
    }
}
