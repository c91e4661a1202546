//! Migrations tracking table repair task.

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::params;
use serde::Deserialize;
use tokio_rusqlite::Connection;

use upkeep_core::{MaintenanceTask, TaskContext, TaskDefinition, TaskError, TaskReport};

/// Parameters for the repair-migrations task.
#[derive(Debug, Deserialize)]
struct RepairMigrationsParams {
    /// SQLite database holding the migrations table.
    database: PathBuf,
    /// Directory containing migration files.
    migrations_dir: PathBuf,
}

/// Records migration files missing from the tracking table.
///
/// Every file in the migrations directory whose stem has no row in the
/// `migrations` table is inserted with the next batch number. Rows are
/// never updated or deleted.
pub struct RepairMigrationsTask {
    definition: TaskDefinition,
}

impl RepairMigrationsTask {
    pub const ID: &'static str = "repair-migrations";

    pub fn new() -> Self {
        Self {
            definition: TaskDefinition::new(
                Self::ID,
                "Repair Migration Table",
                "Records migration files that are missing from the migrations table",
            ),
        }
    }
}

impl Default for RepairMigrationsTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceTask for RepairMigrationsTask {
    fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError> {
        let params: RepairMigrationsParams = serde_json::from_value(params)
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let migrations_dir = ctx.resolve(&params.migrations_dir);
        let mut report = TaskReport::new();

        if !migrations_dir.is_dir() {
            report.error(format!(
                "Migrations directory not found: {}",
                migrations_dir.display()
            ));
            tracing::error!("Migrations directory not found: {}", migrations_dir.display());
            return Ok(report);
        }

        let names = migration_names(&migrations_dir).await?;

        let database = ctx.resolve(&params.database);
        if let Some(parent) = database.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = Connection::open(&database)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))?;

        let inserted = record_missing(&conn, names).await?;

        if inserted.is_empty() {
            report.info("Migration table up to date");
        } else {
            for name in &inserted {
                report.info(format!("Recorded migration: {name}"));
            }
            report.info(format!("Recorded {} missing migrations", inserted.len()));
        }
        tracing::info!(
            task = Self::ID,
            inserted = inserted.len(),
            "repair-migrations finished"
        );
        Ok(report)
    }
}

/// File stems in the migrations directory, sorted for stable batch order.
async fn migration_names(dir: &std::path::Path) -> Result<Vec<String>, TaskError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Insert every name missing from the migrations table, all under one new
/// batch number. Returns the inserted names.
async fn record_missing(conn: &Connection, names: Vec<String>) -> Result<Vec<String>, TaskError> {
    conn.call(move |conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                migration TEXT PRIMARY KEY,
                batch INTEGER NOT NULL
            )",
            [],
        )?;

        let latest: i64 =
            conn.query_row("SELECT COALESCE(MAX(batch), 0) FROM migrations", [], |row| {
                row.get(0)
            })?;
        let batch = latest + 1;

        let tx = conn.transaction()?;
        let mut inserted = Vec::new();
        for name in names {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM migrations WHERE migration = ?1)",
                params![name],
                |row| row.get(0),
            )?;
            if !exists {
                tx.execute(
                    "INSERT INTO migrations (migration, batch) VALUES (?1, ?2)",
                    params![name, batch],
                )?;
                inserted.push(name);
            }
        }
        tx.commit()?;
        Ok(inserted)
    })
    .await
    .map_err(|e| TaskError::Database(e.to_string()))
}

#[cfg(test)]
#[path = "repair_migrations_tests.rs"]
mod tests;
