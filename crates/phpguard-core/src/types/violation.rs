//! The violation record: the output type of every rule.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single reported rule failure.
///
/// Immutable once built. `line` is 1-based and never 0: an unknown
/// location is reported as line 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub file: PathBuf,
    pub line: u32,
    pub message: String,
    pub bad_code: String,
    pub suggested_fix: String,
    pub severity: Severity,
    pub category: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Violation {
    pub fn new(
        file: impl Into<PathBuf>,
        line: u32,
        message: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line: line.max(1),
            message: message.into(),
            bad_code: String::new(),
            suggested_fix: String::new(),
            severity,
            category: category.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder seeded with the given category and severity.
    pub fn builder(
        file: &Path,
        line: u32,
        message: impl Into<String>,
        category: impl Into<String>,
        severity: Severity,
    ) -> ViolationBuilder {
        ViolationBuilder {
            inner: Self::new(file, line, message, severity, category),
        }
    }

    /// Name of the rule that produced this violation, if recorded.
    pub fn rule(&self) -> Option<&str> {
        self.metadata.get("rule").and_then(|v| v.as_str())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {} ({})",
            self.file.display(),
            self.line,
            self.severity,
            self.message,
            self.category
        )
    }
}

/// Incremental construction of a [`Violation`].
#[derive(Debug, Clone)]
pub struct ViolationBuilder {
    inner: Violation,
}

impl ViolationBuilder {
    pub fn bad_code(mut self, code: impl Into<String>) -> Self {
        self.inner.bad_code = code.into().trim().to_string();
        self
    }

    pub fn suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.inner.suggested_fix = fix.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.inner.severity = severity;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.inner.category = category.into();
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inner.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Violation {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_zero_becomes_one() {
        let v = Violation::new("a.php", 0, "m", Severity::Info, "naming");
        assert_eq!(v.line, 1);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(Severity::parse_str("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::parse_str("fatal"), None);
    }

    #[test]
    fn builder_trims_bad_code_and_keeps_metadata() {
        let v = Violation::builder(Path::new("x.php"), 3, "msg", "style", Severity::Warning)
            .bad_code("   $x = 1;  ")
            .meta("rule", "StyleRule")
            .build();
        assert_eq!(v.bad_code, "$x = 1;");
        assert_eq!(v.rule(), Some("StyleRule"));
    }
}
