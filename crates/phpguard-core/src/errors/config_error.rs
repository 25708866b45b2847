//! Configuration errors.

use super::error_code::{self, PhpGuardErrorCode};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unknown rule: {identifier}")]
    UnknownRule { identifier: String },
}

impl PhpGuardErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownRule { .. } => error_code::UNKNOWN_RULE,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
