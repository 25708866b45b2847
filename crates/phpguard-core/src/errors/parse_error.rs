//! Parser adapter errors.

use super::error_code::{self, PhpGuardErrorCode};

/// Failure to turn source text into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{message}")]
    Syntax { message: String, line: u32 },

    #[error("grammar not available: {language}")]
    GrammarUnavailable { language: String },

    #[error("parser returned no tree: {message}")]
    NoTree { message: String },
}

impl ParseError {
    /// Syntax error at a 1-based line. Line 0 is treated as unknown and becomes 1.
    pub fn syntax(message: impl Into<String>, line: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            line: line.max(1),
        }
    }

    /// Source line the failure points at; 1 when the parser could not tell.
    pub fn line(&self) -> u32 {
        match self {
            Self::Syntax { line, .. } => (*line).max(1),
            _ => 1,
        }
    }
}

impl PhpGuardErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } | Self::NoTree { .. } => error_code::PARSE_ERROR,
            Self::GrammarUnavailable { .. } => error_code::GRAMMAR_UNAVAILABLE,
        }
    }
}
