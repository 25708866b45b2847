//! Stable error codes shared across the workspace.

pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const GRAMMAR_UNAVAILABLE: &str = "GRAMMAR_UNAVAILABLE";
pub const RULE_ERROR: &str = "RULE_ERROR";
pub const UNEXPECTED_NODE: &str = "UNEXPECTED_NODE";
pub const FILE_ACCESS_ERROR: &str = "FILE_ACCESS_ERROR";
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
pub const TIME_LIMIT_EXCEEDED: &str = "TIME_LIMIT_EXCEEDED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNKNOWN_RULE: &str = "UNKNOWN_RULE";

/// Every error type in the workspace maps to one of the constants above.
pub trait PhpGuardErrorCode {
    fn error_code(&self) -> &'static str;

    /// Error rendered with its code prefix, e.g. `[PARSE_ERROR] ...`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}
