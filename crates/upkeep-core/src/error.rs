//! Task execution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Task execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
