//! Upkeep - housekeeping tasks with declarative maintenance scheduling.
//!
//! Main entry point for the upkeep CLI.

mod cli;
mod register;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use clap::Parser;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, ScheduleAction};
use register::{build_registry, compile_directives, task_params, RegistryRunner};
use upkeep_config::{Config, ConfigLoader, ConfigValidator};
use upkeep_core::{TaskContext, TaskRegistry};
use upkeep_schedule::{to_cron_schedule, TaskScheduler};
use upkeep_tasks::{
    CleanLogsTask, CleanTempTask, RepairMigrationsTask, ScanDuplicatesTask, ScanTestTagsTask,
};

/// Initialize tracing with console and rolling file output.
fn init_tracing(work_dir: &Path) -> anyhow::Result<()> {
    let log_dir = work_dir.join("storage").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("upkeep")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration.
    static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (human-readable text format with colors)
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer (text format without colors)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path, work_dir: &Path) -> anyhow::Result<Config> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    };

    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    ConfigLoader::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    init_tracing(&work_dir)?;

    let config = Arc::new(load_config(&cli.config, &work_dir)?);
    let registry = Arc::new(build_registry()?);

    let known_tasks: Vec<String> = registry.list().into_iter().map(|d| d.id).collect();
    let validation = ConfigValidator::validate(&config, &known_tasks);
    for warning in &validation.warnings {
        warn!("config: {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            tracing::error!("config: {}: {}", error.path, error.message);
        }
        anyhow::bail!("configuration is invalid");
    }

    match cli.command {
        None | Some(Commands::Run) => run_scheduler(config, registry, work_dir).await,
        Some(Commands::CleanTemp) => {
            let params = task_params(CleanTempTask::ID, &config);
            run_task(&registry, CleanTempTask::ID, params, &work_dir).await
        }
        Some(Commands::CleanLogs { days }) => {
            let mut params = task_params(CleanLogsTask::ID, &config);
            if let Some(days) = days {
                params["days"] = serde_json::json!(days);
            }
            run_task(&registry, CleanLogsTask::ID, params, &work_dir).await
        }
        Some(Commands::ScanDuplicates { folder }) => {
            let mut params = task_params(ScanDuplicatesTask::ID, &config);
            params["folder"] = serde_json::json!(folder);
            run_task(&registry, ScanDuplicatesTask::ID, params, &work_dir).await
        }
        Some(Commands::RepairMigrations) => {
            let params = task_params(RepairMigrationsTask::ID, &config);
            run_task(&registry, RepairMigrationsTask::ID, params, &work_dir).await
        }
        Some(Commands::ScanTestTags) => {
            let params = task_params(ScanTestTagsTask::ID, &config);
            run_task(&registry, ScanTestTagsTask::ID, params, &work_dir).await
        }
        Some(Commands::Schedule {
            action: ScheduleAction::List,
        }) => list_schedule(&config, &registry),
    }
}

/// Run a single task and map its report to a process exit code.
async fn run_task(
    registry: &TaskRegistry,
    task_id: &str,
    params: serde_json::Value,
    work_dir: &Path,
) -> anyhow::Result<ExitCode> {
    let task = registry
        .get(task_id)
        .with_context(|| format!("unknown task: {task_id}"))?;

    let report = task.execute(params, TaskContext::new(work_dir)).await?;
    for line in &report.lines {
        println!("{line}");
    }
    Ok(ExitCode::from(report.exit_code() as u8))
}

/// Compile the schedule, register the directives, and run the scheduler
/// until interrupted.
async fn run_scheduler(
    config: Arc<Config>,
    registry: Arc<TaskRegistry>,
    work_dir: PathBuf,
) -> anyhow::Result<ExitCode> {
    let directives = compile_directives(&config, &registry)?;
    if directives.is_empty() {
        warn!("No schedule directives compiled; scheduler has nothing to do");
    }

    let runner = Arc::new(RegistryRunner {
        registry,
        config: config.clone(),
        work_dir,
    });
    let mut scheduler = TaskScheduler::new(runner)
        .with_tick_interval(Duration::from_secs(config.scheduler.tick_seconds));
    scheduler.register_all(directives);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler.run(shutdown_rx).await;
    Ok(ExitCode::SUCCESS)
}

/// Print the compiled directives and their next fire times.
fn list_schedule(config: &Config, registry: &TaskRegistry) -> anyhow::Result<ExitCode> {
    let directives = compile_directives(config, registry)?;
    if directives.is_empty() {
        println!("No scheduled tasks.");
        return Ok(ExitCode::SUCCESS);
    }

    for directive in &directives {
        let next = to_cron_schedule(&directive.cron_expression)
            .ok()
            .and_then(|schedule| schedule.upcoming(chrono::Utc).next())
            .map(|fire| fire.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<20} next: {}",
            directive.task_id, directive.cron_expression, next
        );
    }
    Ok(ExitCode::SUCCESS)
}
