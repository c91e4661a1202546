//! # Upkeep Tasks
//!
//! Maintenance task implementations: temp directory cleanup, old log
//! archive deletion, duplicate name scanning, migrations table repair,
//! and test tag scanning.

mod report;
mod tasks;

pub use tasks::*;
