//! Old log archive cleanup task.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use upkeep_core::{MaintenanceTask, TaskContext, TaskDefinition, TaskError, TaskReport};

/// Parameters for the clean-logs task.
#[derive(Debug, Deserialize)]
struct CleanLogsParams {
    /// Directory containing the log archives.
    dir: PathBuf,
    /// File extension identifying deletable archives.
    extension: String,
    /// Archives modified more than this many days ago are deleted.
    days: u64,
}

/// Deletes log archives older than the retention window.
pub struct CleanLogsTask {
    definition: TaskDefinition,
}

impl CleanLogsTask {
    pub const ID: &'static str = "clean-logs";

    pub fn new() -> Self {
        Self {
            definition: TaskDefinition::new(
                Self::ID,
                "Clean Old Log Files",
                "Deletes log archives older than the configured number of days",
            ),
        }
    }
}

impl Default for CleanLogsTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceTask for CleanLogsTask {
    fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError> {
        let params: CleanLogsParams = serde_json::from_value(params)
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let dir = ctx.resolve(&params.dir);
        let mut report = TaskReport::new();
        report.info(format!(
            "Cleaning {} log files older than {} days from {}",
            params.extension,
            params.days,
            dir.display()
        ));

        if !dir.exists() {
            report.error(format!("Logs directory does not exist: {}", dir.display()));
            tracing::error!("Logs directory does not exist: {}", dir.display());
            return Ok(report);
        }

        let cutoff = Utc::now() - Duration::days(params.days as i64);
        let deleted = delete_older_than(&dir, &params.extension, cutoff, &mut report).await?;

        report.info(format!(
            "Deleted {} old {} log files",
            deleted, params.extension
        ));
        tracing::info!(task = Self::ID, deleted, "clean-logs finished");
        Ok(report)
    }
}

/// Delete files in `dir` matching `*{extension}` whose modification time is
/// before `cutoff`. Returns the number of deletions.
async fn delete_older_than(
    dir: &Path,
    extension: &str,
    cutoff: DateTime<Utc>,
    report: &mut TaskReport,
) -> Result<usize, TaskError> {
    let pattern = format!("{}/*{}", dir.display(), extension);
    let files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| TaskError::InvalidParameters(e.to_string()))?
        .flatten()
        .collect();

    if files.is_empty() {
        report.info(format!(
            "No {} log files found in {}",
            extension,
            dir.display()
        ));
        return Ok(0);
    }

    let mut deleted = 0;
    for file in files {
        let metadata = tokio::fs::metadata(&file).await?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        if modified < cutoff {
            tokio::fs::remove_file(&file).await?;
            deleted += 1;
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            report.info(format!(
                "Deleted: {} (modified: {})",
                name,
                modified.format("%Y-%m-%d")
            ));
        }
    }

    Ok(deleted)
}

#[cfg(test)]
#[path = "clean_logs_tests.rs"]
mod tests;
