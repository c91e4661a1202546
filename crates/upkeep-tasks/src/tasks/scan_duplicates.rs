//! Duplicate type and file name scanner.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use walkdir::WalkDir;

use upkeep_core::{MaintenanceTask, TaskContext, TaskDefinition, TaskError, TaskReport};

use crate::report::next_report_path;

const REPORT_PREFIX: &str = "duplicate_scan_";

/// Parameters for the scan-duplicates task.
#[derive(Debug, Deserialize)]
struct ScanDuplicatesParams {
    /// Folder to scan, relative to the working directory.
    folder: PathBuf,
    /// Source file extension to inspect.
    extension: String,
    /// Directory receiving the report file.
    report_dir: PathBuf,
}

/// Scans a folder recursively for duplicate type names and file names.
///
/// Only the first type declaration per file is considered; results are
/// written to an indexed report file rather than stdout so repeated scans
/// stay comparable.
pub struct ScanDuplicatesTask {
    definition: TaskDefinition,
}

impl ScanDuplicatesTask {
    pub const ID: &'static str = "scan-duplicates";

    pub fn new() -> Self {
        Self {
            definition: TaskDefinition::new(
                Self::ID,
                "Find Duplicate Types and Files",
                "Scans a folder recursively for duplicate type names and file names",
            ),
        }
    }
}

impl Default for ScanDuplicatesTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceTask for ScanDuplicatesTask {
    fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError> {
        let params: ScanDuplicatesParams = serde_json::from_value(params)
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let folder = ctx.resolve(&params.folder);
        let mut report = TaskReport::new();

        if !folder.is_dir() {
            report.error(format!("Folder not found: {}", folder.display()));
            tracing::error!("Folder not found: {}", folder.display());
            return Ok(report);
        }

        let scan = scan_folder(&folder, &params.extension).await;
        let output = render_duplicates(&scan);

        let report_dir = ctx.resolve(&params.report_dir);
        tokio::fs::create_dir_all(&report_dir).await?;
        let report_path = next_report_path(&report_dir, REPORT_PREFIX);
        tokio::fs::write(&report_path, &output).await?;

        report.info(format!(
            "Scan complete. Results written to: {}",
            report_path.display()
        ));
        tracing::info!(
            task = Self::ID,
            duplicate_types = scan.duplicate_types().count(),
            duplicate_files = scan.duplicate_files().count(),
            "scan-duplicates finished"
        );
        Ok(report)
    }
}

/// Names collected during a scan, each mapped to the paths carrying them.
#[derive(Debug, Default)]
struct ScanIndex {
    type_names: BTreeMap<String, Vec<PathBuf>>,
    file_names: BTreeMap<String, Vec<PathBuf>>,
}

impl ScanIndex {
    fn duplicate_types(&self) -> impl Iterator<Item = (&String, &Vec<PathBuf>)> {
        self.type_names.iter().filter(|(_, paths)| paths.len() > 1)
    }

    fn duplicate_files(&self) -> impl Iterator<Item = (&String, &Vec<PathBuf>)> {
        self.file_names.iter().filter(|(_, paths)| paths.len() > 1)
    }
}

/// Walk `folder` recursively, indexing file names and the first type
/// declaration of every source file with the given extension.
async fn scan_folder(folder: &std::path::Path, extension: &str) -> ScanIndex {
    let type_re = regex::Regex::new(
        r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+([A-Za-z0-9_]+)",
    )
    .unwrap();

    let mut index = ScanIndex::default();

    for entry in WalkDir::new(folder).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }

        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            index
                .file_names
                .entry(name.to_string())
                .or_default()
                .push(path.to_path_buf());
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {}: {e}", path.display());
                continue;
            }
        };
        if let Some(caps) = type_re.captures(&content) {
            index
                .type_names
                .entry(caps[1].to_string())
                .or_default()
                .push(path.to_path_buf());
        }
    }

    index
}

/// Render the duplicate findings as the report file body.
fn render_duplicates(index: &ScanIndex) -> String {
    let duplicate_types: Vec<_> = index.duplicate_types().collect();
    let duplicate_files: Vec<_> = index.duplicate_files().collect();

    if duplicate_types.is_empty() && duplicate_files.is_empty() {
        return "No duplicate type names or file names found.\n".to_string();
    }

    let mut output = String::new();
    if !duplicate_types.is_empty() {
        output.push_str("Duplicate type names:\n");
        render_list(&mut output, &duplicate_types);
    }
    if !duplicate_files.is_empty() {
        output.push_str("Duplicate file names:\n");
        render_list(&mut output, &duplicate_files);
    }
    output
}

fn render_list(output: &mut String, items: &[(&String, &Vec<PathBuf>)]) {
    for (name, paths) in items {
        let _ = writeln!(output, "  {name}:");
        for path in *paths {
            let _ = writeln!(output, "    - {}", path.display());
        }
    }
}

#[cfg(test)]
#[path = "scan_duplicates_tests.rs"]
mod tests;
