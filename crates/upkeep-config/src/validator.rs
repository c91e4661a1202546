//! Configuration validation.

use upkeep_schedule::compile;

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration against the set of known task ids.
    pub fn validate(config: &Config, known_tasks: &[String]) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_temp_files(config, &mut result);
        Self::validate_logs(config, &mut result);
        Self::validate_schedule(config, known_tasks, &mut result);

        result
    }

    fn validate_temp_files(config: &Config, result: &mut ValidationResult) {
        if config.temp_files.directories.is_empty() {
            result.add_warning(ValidationWarning::new(
                "temp_files.directories",
                "no directories configured; clean-temp will do nothing",
            ));
        }
    }

    fn validate_logs(config: &Config, result: &mut ValidationResult) {
        if config.logs.retention_days == 0 {
            result.add_warning(ValidationWarning::new(
                "logs.retention_days",
                "retention of 0 days deletes every archive on each run",
            ));
        }
        if config.logs.extension.is_empty() {
            result.add_warning(ValidationWarning::new(
                "logs.extension",
                "empty extension matches every file in the logs directory",
            ));
        }
    }

    fn validate_schedule(config: &Config, known_tasks: &[String], result: &mut ValidationResult) {
        for (task_id, spec) in &config.schedule {
            let path = format!("schedule.{task_id}");

            if !known_tasks.iter().any(|known| known == task_id) {
                result.add_warning(ValidationWarning::new(
                    &path,
                    "does not match a registered task",
                ));
            }

            match compile(task_id, spec) {
                Err(e) => result.add_error(ValidationError::new(&path, e.to_string())),
                Ok(None) if spec.enabled => result.add_warning(ValidationWarning::new(
                    &path,
                    "yields no schedule directive",
                )),
                Ok(_) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
