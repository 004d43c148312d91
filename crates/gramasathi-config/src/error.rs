//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::validator::ValidationIssue;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `${VAR}` placeholder names a variable that is not set.
    #[error("Config references unset environment variable {0}")]
    MissingEnv(String),

    /// Every validation error found, in check order.
    #[error("Invalid config: {}", describe(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn describe(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
