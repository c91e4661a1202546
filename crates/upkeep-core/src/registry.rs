//! Task registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TaskError;
use crate::task::{MaintenanceTask, TaskDefinition};

/// Registry of available maintenance tasks, keyed by task id.
///
/// Built once at startup and shared read-only afterwards.
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn MaintenanceTask>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Register a task. Fails if the id is already taken.
    pub fn register(&mut self, task: Arc<dyn MaintenanceTask>) -> Result<(), TaskError> {
        let id = task.definition().id.clone();
        if self.tasks.contains_key(&id) {
            return Err(TaskError::AlreadyRegistered(id));
        }
        self.tasks.insert(id, task);
        Ok(())
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn MaintenanceTask>> {
        self.tasks.get(id).cloned()
    }

    /// List all task definitions, sorted by id.
    pub fn list(&self) -> Vec<TaskDefinition> {
        let mut definitions: Vec<_> = self
            .tasks
            .values()
            .map(|task| task.definition().clone())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
