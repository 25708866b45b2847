//! Classification and logging of failures absorbed during a run.
//!
//! Nothing a rule raises escapes `check`: the failure is classified into an
//! [`ErrorCategory`], turned into an [`ErrorRecord`] and appended to either the
//! error log or the warning log depending on the category's severity.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use phpguard_core::errors::RuleError;
use phpguard_core::types::violation::{Severity, Violation};
use serde::Serialize;

/// Fixed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Parsing,
    Validation,
    FileAccess,
    Memory,
    Performance,
    Configuration,
    RuleProcessing,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        Self::Parsing,
        Self::Validation,
        Self::FileAccess,
        Self::Memory,
        Self::Performance,
        Self::Configuration,
        Self::RuleProcessing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Parsing => "PARSING",
            Self::Validation => "VALIDATION",
            Self::FileAccess => "FILE_ACCESS",
            Self::Memory => "MEMORY",
            Self::Performance => "PERFORMANCE",
            Self::Configuration => "CONFIGURATION",
            Self::RuleProcessing => "RULE_PROCESSING",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation | Self::Performance => Severity::Warning,
            Self::Parsing
            | Self::FileAccess
            | Self::Memory
            | Self::Configuration
            | Self::RuleProcessing => Severity::Error,
        }
    }

    /// Whether a scan can keep going productively after this kind of failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation | Self::Memory | Self::Performance | Self::Configuration
        )
    }

    pub fn of(error: &RuleError) -> Self {
        match error {
            RuleError::Parse(_) => Self::Parsing,
            RuleError::UnexpectedNode { .. } => Self::Validation,
            RuleError::FileAccess { .. } => Self::FileAccess,
            RuleError::ResourceExhausted { .. } => Self::Memory,
            RuleError::TimeLimitExceeded { .. } => Self::Performance,
            RuleError::Config(_) => Self::Configuration,
            RuleError::Other { message } => Self::from_message(message),
        }
    }

    /// Best-effort classification of a free-form failure message.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("memory") || lower.contains("allocation") {
            Self::Memory
        } else if lower.contains("timeout") || lower.contains("timed out") || lower.contains("time limit") {
            Self::Performance
        } else {
            Self::RuleProcessing
        }
    }

    /// Category-specific remediation hint for `message`.
    pub fn suggested_fix(&self, message: &str) -> String {
        let fix = match self {
            Self::Parsing => {
                let lower = message.to_ascii_lowercase();
                if lower.contains("unterminated") {
                    "Check for unclosed strings or comments"
                } else if lower.contains("unexpected") {
                    "Check for syntax errors around the reported line"
                } else if lower.contains("missing") {
                    "Add the missing token reported by the parser"
                } else {
                    "Review PHP syntax near the reported line"
                }
            }
            Self::Validation => "The rule met a node shape it did not expect; review the construct on this line",
            Self::FileAccess => "Check that the file exists and is readable",
            Self::Memory => "Split the file or raise performance.max_file_size",
            Self::Performance => "Enable AST caching or raise the performance time limits",
            Self::Configuration => "Check the rule identifier and its options in phpguard.toml",
            Self::RuleProcessing => "Inspect the rule implementation for unhandled input",
        };
        fix.to_string()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a failure happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext<'a> {
    pub file: PathBuf,
    pub rule: Option<&'a str>,
    /// File content, used to quote the offending line.
    pub source: Option<&'a str>,
    /// Line to report when the failure itself carries none.
    pub line: Option<u32>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: &'a str) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    fn quote_line(&self, line: u32) -> String {
        self.source
            .and_then(|src| src.lines().nth(line.saturating_sub(1) as usize))
            .map(|l| l.trim().to_string())
            .unwrap_or_default()
    }
}

/// One logged failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub file: PathBuf,
    pub line: u32,
    pub message: String,
    pub bad_code: String,
    pub severity: Severity,
    pub suggested_fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Unix seconds.
    pub timestamp: u64,
}

impl ErrorRecord {
    /// Violation-shaped view of this record, for reports that merge both.
    pub fn to_violation(&self) -> Violation {
        let mut builder = Violation::builder(
            &self.file,
            self.line,
            self.message.clone(),
            format!("error.{}", self.category.name().to_ascii_lowercase()),
            self.severity,
        )
        .bad_code(self.bad_code.clone())
        .suggested_fix(self.suggested_fix.clone())
        .meta("error_category", self.category.name());
        if let Some(rule) = &self.rule {
            builder = builder.meta("rule", rule.clone());
        }
        builder.build()
    }
}

/// Counts over both logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStats {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub by_category: BTreeMap<ErrorCategory, usize>,
}

impl ErrorStats {
    pub fn count(&self, category: ErrorCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub summary: ErrorStats,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<ErrorRecord>,
    pub has_recoverable_errors: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Default)]
struct Logs {
    errors: Vec<ErrorRecord>,
    warnings: Vec<ErrorRecord>,
}

/// Append-only error and warning logs, safe to share across threads.
#[derive(Debug, Default)]
pub struct ErrorHandler {
    logs: Mutex<Logs>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and log a failure returned by a rule or the engine.
    pub fn handle(&self, error: &RuleError, ctx: &ErrorContext<'_>) -> ErrorRecord {
        let category = ErrorCategory::of(error);
        let line = error.line().or(ctx.line).unwrap_or(1);
        self.push(category, error.to_string(), line, ctx)
    }

    /// Log a panic caught at the rule boundary.
    pub fn handle_panic(&self, message: &str, ctx: &ErrorContext<'_>) -> ErrorRecord {
        let category = ErrorCategory::from_message(message);
        self.push(
            category,
            format!("rule panicked: {message}"),
            ctx.line.unwrap_or(1),
            ctx,
        )
    }

    /// Log an engine-detected condition under an explicit category.
    pub fn record(
        &self,
        category: ErrorCategory,
        message: impl Into<String>,
        ctx: &ErrorContext<'_>,
    ) -> ErrorRecord {
        self.push(category, message.into(), ctx.line.unwrap_or(1), ctx)
    }

    fn push(
        &self,
        category: ErrorCategory,
        message: String,
        line: u32,
        ctx: &ErrorContext<'_>,
    ) -> ErrorRecord {
        let line = line.max(1);
        let record = ErrorRecord {
            category,
            file: ctx.file.clone(),
            line,
            bad_code: ctx.quote_line(line),
            severity: category.severity(),
            suggested_fix: category.suggested_fix(&message),
            message,
            rule: ctx.rule.map(str::to_string),
            timestamp: current_unix_time(),
        };

        let mut logs = self.lock();
        if record.severity == Severity::Error {
            logs.errors.push(record.clone());
        } else {
            logs.warnings.push(record.clone());
        }
        record
    }

    pub fn get_errors(&self) -> Vec<ErrorRecord> {
        self.lock().errors.clone()
    }

    pub fn get_warnings(&self) -> Vec<ErrorRecord> {
        self.lock().warnings.clone()
    }

    pub fn clear(&self) {
        let mut logs = self.lock();
        logs.errors.clear();
        logs.warnings.clear();
    }

    pub fn error_stats(&self) -> ErrorStats {
        let logs = self.lock();
        let mut by_category = BTreeMap::new();
        for record in logs.errors.iter().chain(&logs.warnings) {
            *by_category.entry(record.category).or_insert(0) += 1;
        }
        ErrorStats {
            total_errors: logs.errors.len(),
            total_warnings: logs.warnings.len(),
            by_category,
        }
    }

    /// True when any logged record belongs to a recoverable category.
    pub fn has_recoverable_errors(&self) -> bool {
        let logs = self.lock();
        logs.errors
            .iter()
            .chain(&logs.warnings)
            .any(|r| r.category.is_recoverable())
    }

    pub fn detailed_report(&self) -> ErrorReport {
        let summary = self.error_stats();
        let suggestions = suggestions_for(&summary);
        let (errors, warnings) = {
            let logs = self.lock();
            (logs.errors.clone(), logs.warnings.clone())
        };
        ErrorReport {
            has_recoverable_errors: errors
                .iter()
                .chain(&warnings)
                .any(|r| r.category.is_recoverable()),
            summary,
            errors,
            warnings,
            suggestions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Logs> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn suggestions_for(stats: &ErrorStats) -> Vec<String> {
    let mut out = Vec::new();
    if stats.count(ErrorCategory::Parsing) > 0 {
        out.push("Add a PHP syntax check (php -l) to the pipeline before running rules".to_string());
    }
    if stats.count(ErrorCategory::FileAccess) > 0 {
        out.push("Verify read permissions on the scanned paths".to_string());
    }
    if stats.count(ErrorCategory::Memory) > 0 {
        out.push("Process large files in chunks or stream them instead of loading them whole".to_string());
    }
    if stats.count(ErrorCategory::Performance) >= 2 {
        out.push("Enable or tune AST caching (cache.max_entries, cache.ttl_seconds)".to_string());
    }
    if stats.count(ErrorCategory::Configuration) > 0 {
        out.push("Fix the rule configuration so every configured rule loads".to_string());
    }
    out
}

fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
