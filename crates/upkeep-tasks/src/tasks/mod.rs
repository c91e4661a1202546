//! Maintenance task implementations.

mod clean_logs;
mod clean_temp;
mod repair_migrations;
mod scan_duplicates;
mod scan_test_tags;

pub use clean_logs::CleanLogsTask;
pub use clean_temp::CleanTempTask;
pub use repair_migrations::RepairMigrationsTask;
pub use scan_duplicates::ScanDuplicatesTask;
pub use scan_test_tags::ScanTestTagsTask;
