//! Task trait and supporting types.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Identity and description of a maintenance task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique identifier, used for CLI dispatch and schedule lookup.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Description of what the task does.
    pub description: String,
}

impl TaskDefinition {
    /// Create a new task definition.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Execution context handed to every task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Base directory against which relative paths resolve.
    pub work_dir: PathBuf,
}

impl TaskContext {
    /// Create a new context rooted at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Resolve a path against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

/// Outcome of a task run: progress lines plus an overall status.
///
/// Tasks accumulate output as they go and keep running past soft failures,
/// so a report can carry both progress and error lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// Whether the run completed without errors.
    pub success: bool,

    /// Human-readable progress lines, in emission order.
    pub lines: Vec<String>,
}

impl TaskReport {
    /// Create an empty, successful report.
    pub fn new() -> Self {
        Self {
            success: true,
            lines: Vec::new(),
        }
    }

    /// Append a progress line.
    pub fn info(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append an error line and mark the run failed.
    pub fn error(&mut self, line: impl Into<String>) {
        self.lines.push(format!("error: {}", line.into()));
        self.success = false;
    }

    /// Process exit status for this report.
    pub fn exit_code(&self) -> i32 {
        if self.success { 0 } else { 1 }
    }
}

impl Default for TaskReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Core trait for maintenance tasks.
///
/// Tasks receive JSON parameters assembled by the caller from configuration
/// and CLI flags. Expected problems (a missing directory, leftover files)
/// are reported through `TaskReport` rather than as errors; `TaskError` is
/// reserved for malformed parameters and I/O or database failures.
#[async_trait]
pub trait MaintenanceTask: Send + Sync {
    /// Returns the task definition.
    fn definition(&self) -> &TaskDefinition;

    /// Execute the task.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError>;
}
