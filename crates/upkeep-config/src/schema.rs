//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use upkeep_schedule::ScheduleSpec;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub temp_files: TempFilesConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Per-task schedule specifications, keyed by task id.
    #[serde(default)]
    pub schedule: HashMap<String, ScheduleSpec>,
}

/// Directories cleared by the clean-temp task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempFilesConfig {
    #[serde(default = "default_temp_directories")]
    pub directories: Vec<PathBuf>,
}

impl Default for TempFilesConfig {
    fn default() -> Self {
        Self {
            directories: default_temp_directories(),
        }
    }
}

fn default_temp_directories() -> Vec<PathBuf> {
    vec![
        PathBuf::from("storage/temp"),
        PathBuf::from("storage/app/temp"),
    ]
}

/// Log archive cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Directory holding the log archives; also receives scan reports.
    #[serde(default = "default_logs_dir")]
    pub dir: PathBuf,

    /// File extension identifying deletable archives.
    #[serde(default = "default_log_extension")]
    pub extension: String,

    /// Days an archive is kept before clean-logs deletes it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            dir: default_logs_dir(),
            extension: default_log_extension(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("storage/logs")
}

fn default_log_extension() -> String {
    ".gz".to_string()
}

fn default_retention_days() -> u64 {
    30
}

/// Source and test scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Source file extension inspected by the scanners.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Directory containing test sources.
    #[serde(default = "default_tests_dir")]
    pub tests_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            tests_dir: default_tests_dir(),
        }
    }
}

fn default_source_extension() -> String {
    "rs".to_string()
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from("tests")
}

/// Migrations database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database holding the migrations tracking table.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Directory containing migration files.
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            migrations_dir: default_migrations_dir(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("storage/upkeep.db")
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

/// Scheduler loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-task checks.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

fn default_tick_seconds() -> u64 {
    60
}
