//! CLI definitions for upkeep.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Upkeep CLI.
#[derive(Parser)]
#[command(name = "upkeep")]
#[command(about = "Housekeeping tasks with declarative maintenance scheduling")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Working directory
    #[arg(short, long, global = true)]
    pub work_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler in the foreground (default)
    Run,

    /// Remove files from the configured temporary directories
    CleanTemp,

    /// Delete log archives older than the retention window
    CleanLogs {
        /// Number of days to keep logs
        #[arg(long)]
        days: Option<u64>,
    },

    /// Scan a folder recursively for duplicate type and file names
    ScanDuplicates {
        /// Folder to scan (relative to the working directory)
        folder: PathBuf,
    },

    /// Record migration files missing from the migrations table
    RepairMigrations,

    /// Scan test sources for test functions not named test*
    ScanTestTags,

    /// Schedule inspection commands
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ScheduleAction {
    /// List compiled schedule directives
    List,
}
