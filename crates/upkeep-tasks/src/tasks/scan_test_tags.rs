//! Test tag scanner.

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use walkdir::WalkDir;

use upkeep_core::{MaintenanceTask, TaskContext, TaskDefinition, TaskError, TaskReport};

use crate::report::next_report_path;

const REPORT_PREFIX: &str = "non_test_methods_";

/// Parameters for the scan-test-tags task.
#[derive(Debug, Deserialize)]
struct ScanTestTagsParams {
    /// Directory containing test sources.
    tests_dir: PathBuf,
    /// Source file extension to inspect.
    extension: String,
    /// Directory receiving the report file.
    report_dir: PathBuf,
}

/// Flags functions carrying a test attribute whose name does not follow the
/// `test` prefix convention.
pub struct ScanTestTagsTask {
    definition: TaskDefinition,
}

impl ScanTestTagsTask {
    pub const ID: &'static str = "scan-test-tags";

    pub fn new() -> Self {
        Self {
            definition: TaskDefinition::new(
                Self::ID,
                "Scan Test Tags",
                "Scans test sources for test functions not named test*",
            ),
        }
    }
}

impl Default for ScanTestTagsTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MaintenanceTask for ScanTestTagsTask {
    fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: TaskContext,
    ) -> Result<TaskReport, TaskError> {
        let params: ScanTestTagsParams = serde_json::from_value(params)
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let tests_dir = ctx.resolve(&params.tests_dir);
        let mut report = TaskReport::new();

        if !tests_dir.is_dir() {
            report.error(format!(
                "Tests directory not found: {}",
                tests_dir.display()
            ));
            tracing::error!("Tests directory not found: {}", tests_dir.display());
            return Ok(report);
        }

        let findings = scan_tests(&tests_dir, &params.extension).await;
        let output = render_findings(&findings);

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
            flagged = findings.iter().map(|(_, names)| names.len()).sum::<usize>(),
            "scan-test-tags finished"
        );
        Ok(report)
    }
}

/// Walk the tests directory and collect, per file, the test-attributed
/// functions whose names do not start with `test`.
async fn scan_tests(dir: &std::path::Path, extension: &str) -> Vec<(PathBuf, Vec<String>)> {
    let test_fn_re = regex::Regex::new(
        r"(?m)#\[(?:tokio::)?test[^\]]*\]\s*(?:#\[[^\]]*\]\s*)*(?:pub\s+)?(?:async\s+)?fn\s+([A-Za-z0-9_]+)",
    )
    .unwrap();

    let mut findings = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {}: {e}", path.display());
                continue;
            }
        };

        let flagged: Vec<String> = test_fn_re
            .captures_iter(&content)
            .map(|caps| caps[1].to_string())
            .filter(|name| !name.starts_with("test"))
            .collect();

        if !flagged.is_empty() {
            findings.push((path.to_path_buf(), flagged));
        }
    }

    findings
}

/// Render the findings as the report file body.
fn render_findings(findings: &[(PathBuf, Vec<String>)]) -> String {
    if findings.is_empty() {
        return "No mis-tagged test functions found.\n".to_string();
    }

    let mut output = String::from("Test functions not named test*:\n");
    for (path, names) in findings {
        let _ = writeln!(output, "File: {}", path.display());
        for name in names {
            let _ = writeln!(output, "  - {name}");
        }
    }
    output
}

#[cfg(test)]
#[path = "scan_test_tags_tests.rs"]
mod tests;
