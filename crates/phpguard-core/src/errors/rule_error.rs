//! Failures raised while a rule inspects a tree.

use std::path::PathBuf;

use super::error_code::{self, PhpGuardErrorCode};
use super::{ConfigError, ParseError};

/// Errors a rule's `perform_checks` step may return.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unexpected node shape at line {line}: expected {expected}")]
    UnexpectedNode { expected: String, line: u32 },

    #[error("cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource exhausted: {message}")]
    ResourceExhausted { message: String },

    #[error("time limit exceeded after {elapsed_ms}ms (limit {limit_ms}ms)")]
    TimeLimitExceeded { elapsed_ms: u64, limit_ms: u64 },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{message}")]
    Other { message: String },
}

impl RuleError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Source line attached to the failure, when it carries one.
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Parse(e) => Some(e.line()),
            Self::UnexpectedNode { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl PhpGuardErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::UnexpectedNode { .. } => error_code::UNEXPECTED_NODE,
            Self::FileAccess { .. } => error_code::FILE_ACCESS_ERROR,
            Self::ResourceExhausted { .. } => error_code::RESOURCE_EXHAUSTED,
            Self::TimeLimitExceeded { .. } => error_code::TIME_LIMIT_EXCEEDED,
            Self::Config(e) => e.error_code(),
            Self::Other { .. } => error_code::RULE_ERROR,
        }
    }
}
