//! Task registration and schedule wiring.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tracing::{debug, warn};

use upkeep_config::Config;
use upkeep_core::{TaskContext, TaskRegistry};
use upkeep_schedule::{compile, CompiledDirective, ScheduleError, TaskRunner};
use upkeep_tasks::{
    CleanLogsTask, CleanTempTask, RepairMigrationsTask, ScanDuplicatesTask, ScanTestTagsTask,
};

/// Build the registry of maintenance tasks.
pub(crate) fn build_registry() -> anyhow::Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    registry.register(Arc::new(CleanTempTask::new()))?;
    registry.register(Arc::new(CleanLogsTask::new()))?;
    registry.register(Arc::new(ScanDuplicatesTask::new()))?;
    registry.register(Arc::new(RepairMigrationsTask::new()))?;
    registry.register(Arc::new(ScanTestTagsTask::new()))?;
    Ok(registry)
}

/// Compile the configured schedule into directives, sorted by task id.
///
/// Entries that do not name a registered task are skipped with a warning.
/// A malformed time value is a hard error so the scheduler never boots
/// with a half-valid schedule.
pub(crate) fn compile_directives(
    config: &Config,
    registry: &TaskRegistry,
) -> anyhow::Result<Vec<CompiledDirective>> {
    let mut task_ids: Vec<_> = config.schedule.keys().collect();
    task_ids.sort();

    let mut directives = Vec::new();
    for task_id in task_ids {
        let spec = &config.schedule[task_id];
        if registry.get(task_id).is_none() {
            warn!("Schedule entry '{task_id}' does not match a registered task");
            continue;
        }
        match compile(task_id, spec).with_context(|| format!("schedule entry '{task_id}'"))? {
            Some(directive) => directives.push(directive),
            None => debug!("Schedule entry '{task_id}' yields no directive"),
        }
    }
    Ok(directives)
}

/// Assemble the JSON parameter object for a task from configuration.
///
/// Scheduled runs use these values as-is; CLI subcommands overlay their
/// flag values on top.
pub(crate) fn task_params(task_id: &str, config: &Config) -> serde_json::Value {
    match task_id {
        CleanTempTask::ID => json!({
            "directories": config.temp_files.directories,
        }),
        CleanLogsTask::ID => json!({
            "dir": config.logs.dir,
            "extension": config.logs.extension,
            "days": config.logs.retention_days,
        }),
        ScanDuplicatesTask::ID => json!({
            "folder": ".",
            "extension": config.scan.source_extension,
            "report_dir": config.logs.dir,
        }),
        RepairMigrationsTask::ID => json!({
            "database": config.database.path,
            "migrations_dir": config.database.migrations_dir,
        }),
        ScanTestTagsTask::ID => json!({
            "tests_dir": config.scan.tests_dir,
            "extension": config.scan.source_extension,
            "report_dir": config.logs.dir,
        }),
        _ => json!({}),
    }
}

/// Bridges the scheduler to the task registry.
pub(crate) struct RegistryRunner {
    pub registry: Arc<TaskRegistry>,
    pub config: Arc<Config>,
    pub work_dir: PathBuf,
}

#[async_trait::async_trait]
impl TaskRunner for RegistryRunner {
    async fn run_task(&self, task_id: &str) -> Result<(), ScheduleError> {
        let task = self
            .registry
            .get(task_id)
            .ok_or_else(|| ScheduleError::RunFailed(format!("task not found: {task_id}")))?;

        let params = task_params(task_id, &self.config);
        let ctx = TaskContext::new(self.work_dir.clone());
        let report = task
            .execute(params, ctx)
            .await
            .map_err(|e| ScheduleError::RunFailed(e.to_string()))?;

        for line in &report.lines {
            tracing::info!(task = task_id, "{line}");
        }
        if !report.success {
            return Err(ScheduleError::RunFailed(format!(
                "task '{task_id}' reported failure"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upkeep_schedule::{Frequency, ScheduleSpec};

    fn spec(frequency: Frequency, time: &str) -> ScheduleSpec {
        ScheduleSpec {
            enabled: true,
            frequency,
            time: time.to_string(),
            day: None,
            cron: None,
        }
    }

    #[test]
    fn test_registry_has_all_tasks() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 5);
        for id in [
            "clean-temp",
            "clean-logs",
            "scan-duplicates",
            "repair-migrations",
            "scan-test-tags",
        ] {
            assert!(registry.get(id).is_some(), "missing task {id}");
        }
    }

    #[test]
    fn test_compile_directives_skips_unknown_tasks() {
        let registry = build_registry().unwrap();
        let mut config = Config::default();
        config
            .schedule
            .insert("clean-temp".to_string(), spec(Frequency::Daily, "01:00"));
        config
            .schedule
            .insert("defrag-disk".to_string(), spec(Frequency::Daily, "02:00"));

        let directives = compile_directives(&config, &registry).unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].task_id, "clean-temp");
        assert_eq!(directives[0].cron_expression, "0 1 * * *");
    }

    #[test]
    fn test_compile_directives_skips_disabled_tasks() {
        let registry = build_registry().unwrap();
        let mut config = Config::default();
        let mut disabled = spec(Frequency::Daily, "01:00");
        disabled.enabled = false;
        config.schedule.insert("clean-temp".to_string(), disabled);

        let directives = compile_directives(&config, &registry).unwrap();
        assert!(directives.is_empty());
    }

    #[test]
    fn test_compile_directives_rejects_bad_time() {
        let registry = build_registry().unwrap();
        let mut config = Config::default();
        config
            .schedule
            .insert("clean-logs".to_string(), spec(Frequency::Daily, "25:00"));

        assert!(compile_directives(&config, &registry).is_err());
    }

    #[test]
    fn test_task_params_uses_config_values() {
        let config = Config::default();
        let params = task_params(CleanLogsTask::ID, &config);
        assert_eq!(params["days"], 30);
        assert_eq!(params["extension"], ".gz");
    }
}
