//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// One finding, addressed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// More contexts than this is allowed but warned about.
const MAX_SENSIBLE_CONTEXTS: usize = 32;

/// Errors block startup; warnings are only logged.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(path, message));
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(path, message));
    }

    /// The warnings, or every error at once.
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, ConfigError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ConfigError::Invalid(self.errors))
        }
    }
}

/// Checks a loaded [`Config`] before anything is started with it.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::check_server(config, &mut result);
        Self::check_browser(config, &mut result);
        Self::check_engine(config, &mut result);
        Self::check_storage(config, &mut result);
        Self::check_heuristics(config, &mut result);
        Self::check_registry(config, &mut result);
        result
    }

    fn check_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.error("server.port", "must not be 0");
        }
        if config.server.host.trim().is_empty() {
            result.error("server.host", "must not be empty");
        }
    }

    fn check_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;

        if browser.debug_port == 0 {
            result.error("browser.debug_port", "must not be 0");
        }
        match browser.max_contexts {
            0 => result.error("browser.max_contexts", "must be at least 1"),
            n if n > MAX_SENSIBLE_CONTEXTS => result.warn(
                "browser.max_contexts",
                format!("{} concurrent contexts may exhaust Chrome's memory", n),
            ),
            _ => {}
        }
        if browser.acquire_timeout_secs == 0 {
            result.error("browser.acquire_timeout_secs", "must be at least 1");
        }
        if let Some(path) = browser.chrome_path.as_ref().filter(|p| !p.exists()) {
            result.warn(
                "browser.chrome_path",
                format!("{} does not exist", path.display()),
            );
        }
    }

    fn check_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;
        let waits = [
            ("engine.locator_timeout_ms", engine.locator_timeout_ms),
            ("engine.navigation_timeout_ms", engine.navigation_timeout_ms),
            ("engine.dialog_timeout_ms", engine.dialog_timeout_ms),
            ("engine.settle_ms", engine.settle_ms),
        ];
        for (path, value) in waits {
            if value == 0 {
                result.error(path, "must be greater than 0");
            }
        }

        if engine.settle_ms > engine.navigation_timeout_ms {
            result.warn(
                "engine.settle_ms",
                "exceeds navigation_timeout_ms; slow navigations will report timed-out",
            );
        }
        if let Some(dir) = engine.forms_dir.as_ref().filter(|d| !d.is_dir()) {
            result.warn("engine.forms_dir", format!("{} is not a directory", dir.display()));
        }
    }

    fn check_storage(config: &Config, result: &mut ValidationResult) {
        match config.storage.backend.as_str() {
            "file" => {}
            "memory" => result.warn("storage.backend", "memory backend loses all data on restart"),
            other => result.error(
                "storage.backend",
                format!("unknown backend '{}', expected \"file\" or \"memory\"", other),
            ),
        }
    }

    fn check_heuristics(config: &Config, result: &mut ValidationResult) {
        let keywords = &config.heuristics.keywords;
        if keywords.is_empty() {
            result.warn(
                "heuristics.keywords",
                "empty; unknown forms resolve only a submit locator",
            );
        }

        for (i, rule) in keywords.iter().enumerate() {
            let path = format!("heuristics.keywords[{}]", i);
            if rule.keyword.trim().is_empty() || rule.field.trim().is_empty() {
                result.error(path, "keyword and field must both be non-empty");
            } else if rule.keyword != rule.keyword.to_lowercase() {
                result.warn(path, "attributes are lowercased before matching; uppercase never matches");
            }
        }
    }

    fn check_registry(config: &Config, result: &mut ValidationResult) {
        for (url, fields) in &config.registry {
            let path = format!("registry.{}", url);
            if fields.is_empty() {
                result.error(&path, "has no locators");
            }
            for (field, locator) in fields {
                if locator.trim().is_empty() {
                    result.error(format!("{}.{}", path, field), "locator must not be empty");
                }
            }
            if !fields.contains_key("submit") {
                result.warn(path, "no submit locator; tasks for this form never submit");
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
