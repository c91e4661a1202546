//! Temporary directory cleanup task.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use upkeep_core::{MaintenanceTask, TaskContext, TaskDefinition, TaskError, TaskReport};

/// Parameters for the clean-temp task.
#[derive(Debug, Deserialize)]
struct CleanTempParams {
    /// Directories to clear.
    directories: Vec<PathBuf>,
}

/// Removes every entry from the configured temporary directories.
///
/// A missing directory or leftover files mark the run failed, but the
/// remaining directories are still processed.
pub struct CleanTempTask {
    definition: TaskDefinition,
}

impl CleanTempTask {
    pub const ID: &'static str = "clean-temp";

    pub fn new() -> Self {
        Self {
            definition: TaskDefinition::new(
                Self::ID,
                "Clean Temporary Files",
                "Removes files from the configured temporary directories",
            ),
        }
    }
}

impl Default for CleanTempTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceTask for CleanTempTask {
    fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError> {
        let params: CleanTempParams = serde_json::from_value(params)
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let mut report = TaskReport::new();

        for dir in &params.directories {
            let dir = ctx.resolve(dir);
            if !dir.exists() {
                report.error(format!(
                    "cleanup not complete: missing directory: {}",
                    dir.display()
                ));
                tracing::error!("cleanup not complete: missing directory: {}", dir.display());
                continue;
            }

            clear_directory(&dir).await?;

            if directory_is_empty(&dir).await? {
                report.info(format!("Temp files cleaned from: {}", dir.display()));
            } else {
                report.error(format!(
                    "Temp files not removed from directory: {}",
                    dir.display()
                ));
                tracing::error!("Temp files not removed from directory: {}", dir.display());
            }
        }

        report.info("Clean up process complete");
        tracing::info!(task = Self::ID, success = report.success, "clean-temp finished");
        Ok(report)
    }
}

/// Delete every entry inside `dir`, leaving the directory itself in place.
async fn clear_directory(dir: &Path) -> Result<(), TaskError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

async fn directory_is_empty(dir: &Path) -> Result<bool, TaskError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    Ok(entries.next_entry().await?.is_none())
}

#[cfg(test)]
#[path = "clean_temp_tests.rs"]
mod tests;
