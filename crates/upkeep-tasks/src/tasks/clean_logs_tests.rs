use super::*;
use tempfile::TempDir;

fn params(dir: &Path, days: u64) -> serde_json::Value {
    serde_json::json!({
        "dir": dir,
        "extension": ".gz",
        "days": days,
    })
}

#[tokio::test]
async fn test_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("logs");

    let task = CleanLogsTask::new();
    let report = task
        .execute(params(&missing, 30), TaskContext::new(temp.path()))
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.exit_code(), 1);
    assert!(report.lines.iter().any(|l| l.contains("does not exist")));
}

#[tokio::test]
async fn test_no_matching_files_succeeds() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    tokio::fs::create_dir(&logs).await.unwrap();
    tokio::fs::write(logs.join("app.log"), "current").await.unwrap();

    let task = CleanLogsTask::new();
    let report = task
        .execute(params(&logs, 30), TaskContext::new(temp.path()))
        .await
        .unwrap();

    assert!(report.success);
    assert!(report.lines.iter().any(|l| l.contains("No .gz log files found")));
    assert!(logs.join("app.log").exists());
}

#[tokio::test]
async fn test_recent_archives_are_kept() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    tokio::fs::create_dir(&logs).await.unwrap();
    tokio::fs::write(logs.join("app.log.1.gz"), "archive").await.unwrap();

    let task = CleanLogsTask::new();
    let report = task
        .execute(params(&logs, 30), TaskContext::new(temp.path()))
        .await
        .unwrap();

    assert!(report.success);
    assert!(logs.join("app.log.1.gz").exists());
    assert!(report.lines.iter().any(|l| l.contains("Deleted 0 old .gz log files")));
}

#[tokio::test]
async fn test_expired_archives_are_deleted() {
    let temp = TempDir::new().unwrap();
    tokio::fs::write(temp.path().join("app.log.1.gz"), "old").await.unwrap();
    tokio::fs::write(temp.path().join("app.log.2.gz"), "old").await.unwrap();
    tokio::fs::write(temp.path().join("app.log"), "current").await.unwrap();

    // A cutoff in the future makes every existing archive "old".
    let cutoff = Utc::now() + Duration::days(1);
    let mut report = TaskReport::new();
    let deleted = delete_older_than(temp.path(), ".gz", cutoff, &mut report)
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert!(!temp.path().join("app.log.1.gz").exists());
    assert!(!temp.path().join("app.log.2.gz").exists());
    // Files without the extension are never considered.
    assert!(temp.path().join("app.log").exists());
    assert_eq!(report.lines.iter().filter(|l| l.starts_with("Deleted:")).count(), 2);
}

#[tokio::test]
async fn test_fresh_archives_survive_past_cutoff() {
    let temp = TempDir::new().unwrap();
    tokio::fs::write(temp.path().join("app.log.1.gz"), "new").await.unwrap();

    let cutoff = Utc::now() - Duration::hours(1);
    let mut report = TaskReport::new();
    let deleted = delete_older_than(temp.path(), ".gz", cutoff, &mut report)
        .await
        .unwrap();

    assert_eq!(deleted, 0);
    assert!(temp.path().join("app.log.1.gz").exists());
}

#[tokio::test]
async fn test_invalid_params() {
    let temp = TempDir::new().unwrap();
    let task = CleanLogsTask::new();
    let result = task
        .execute(serde_json::json!({"days": 30}), TaskContext::new(temp.path()))
        .await;
    assert!(matches!(result, Err(TaskError::InvalidParameters(_))));
}

#[test]
fn test_definition() {
    let task = CleanLogsTask::default();
    assert_eq!(task.definition().id, "clean-logs");
}
