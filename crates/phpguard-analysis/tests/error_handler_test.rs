//! ErrorHandler classification, logs, stats and reports.

use std::path::{Path, PathBuf};

use phpguard_analysis::engine::{ErrorCategory, ErrorContext, ErrorHandler};
use phpguard_core::errors::{ConfigError, ParseError, RuleError};
use phpguard_core::Severity;

fn ctx() -> ErrorContext<'static> {
    ErrorContext::new(Path::new("app/Foo.php"))
}

#[test]
fn categories_map_to_logs_by_severity() {
    let handler = ErrorHandler::new();
    handler.handle(&RuleError::from(ParseError::syntax("syntax error, unexpected '}' on line 4", 4)), &ctx());
    handler.handle(
        &RuleError::UnexpectedNode {
            expected: "method".into(),
            line: 2,
        },
        &ctx(),
    );
    handler.handle(
        &RuleError::FileAccess {
            path: PathBuf::from("app/Foo.php"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        },
        &ctx(),
    );
    handler.handle(
        &RuleError::ResourceExhausted {
            message: "too large".into(),
        },
        &ctx(),
    );
    handler.handle(
        &RuleError::TimeLimitExceeded {
            elapsed_ms: 20,
            limit_ms: 10,
        },
        &ctx(),
    );
    handler.handle(
        &RuleError::Config(ConfigError::UnknownRule {
            identifier: "Nope".into(),
        }),
        &ctx(),
    );

    let errors: Vec<ErrorCategory> = handler.get_errors().iter().map(|r| r.category).collect();
    let warnings: Vec<ErrorCategory> = handler.get_warnings().iter().map(|r| r.category).collect();
    assert_eq!(
        errors,
        vec![
            ErrorCategory::Parsing,
            ErrorCategory::FileAccess,
            ErrorCategory::Memory,
            ErrorCategory::Configuration
        ]
    );
    assert_eq!(warnings, vec![ErrorCategory::Validation, ErrorCategory::Performance]);

    let stats = handler.error_stats();
    assert_eq!(stats.total_errors, 4);
    assert_eq!(stats.total_warnings, 2);
    assert_eq!(stats.count(ErrorCategory::Parsing), 1);
    assert_eq!(stats.count(ErrorCategory::RuleProcessing), 0);
}

#[test]
fn parse_record_carries_line_and_suggestion() {
    let handler = ErrorHandler::new();
    let record = handler.handle(
        &RuleError::from(ParseError::syntax(
            "syntax error, unterminated string or comment starting on line 2",
            2,
        )),
        &ctx(),
    );
    assert_eq!(record.line, 2);
    assert_eq!(record.severity, Severity::Error);
    assert_eq!(record.suggested_fix, "Check for unclosed strings or comments");
    assert!(record.timestamp > 0);
}

#[test]
fn recoverable_only_when_a_recoverable_category_is_logged() {
    let handler = ErrorHandler::new();
    handler.record(ErrorCategory::Parsing, "bad", &ctx());
    handler.record(ErrorCategory::FileAccess, "gone", &ctx());
    assert!(!handler.has_recoverable_errors());

    handler.record(ErrorCategory::Memory, "big", &ctx());
    assert!(handler.has_recoverable_errors());
}

#[test]
fn clear_empties_both_logs() {
    let handler = ErrorHandler::new();
    handler.record(ErrorCategory::Parsing, "bad", &ctx());
    handler.record(ErrorCategory::Performance, "slow", &ctx());
    handler.clear();
    assert!(handler.get_errors().is_empty());
    assert!(handler.get_warnings().is_empty());
    assert_eq!(handler.error_stats().total_errors, 0);
}

#[test]
fn detailed_report_suggestions() {
    let handler = ErrorHandler::new();
    handler.record(ErrorCategory::Parsing, "bad", &ctx());
    handler.record(ErrorCategory::Memory, "big", &ctx());
    handler.record(ErrorCategory::Performance, "slow", &ctx());
    let report = handler.detailed_report();
    assert_eq!(report.suggestions.len(), 2);
    assert!(report.suggestions[0].contains("syntax"));
    assert!(report.suggestions[1].contains("chunks"));

    handler.record(ErrorCategory::Performance, "slow again", &ctx());
    let report = handler.detailed_report();
    assert!(report.suggestions.iter().any(|s| s.contains("AST caching")));
    assert!(report.has_recoverable_errors);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn report_serializes_with_category_names() {
    let handler = ErrorHandler::new();
    handler.record(ErrorCategory::FileAccess, "gone", &ctx());
    let json = serde_json::to_value(handler.detailed_report()).unwrap();
    assert_eq!(json["errors"][0]["category"], "FILE_ACCESS");
    assert_eq!(json["summary"]["by_category"]["FILE_ACCESS"], 1);
    assert_eq!(json["errors"][0]["severity"], "error");
}

#[test]
fn panic_classification_by_message() {
    let handler = ErrorHandler::new();
    assert_eq!(handler.handle_panic("allocation failed: out of memory", &ctx()).category, ErrorCategory::Memory);
    assert_eq!(handler.handle_panic("operation timeout", &ctx()).category, ErrorCategory::Performance);
    assert_eq!(handler.handle_panic("unwrap on None", &ctx()).category, ErrorCategory::RuleProcessing);
    assert_eq!(handler.get_errors().len(), 2);
    assert_eq!(handler.get_warnings().len(), 1);
}

#[test]
fn record_to_violation() {
    let handler = ErrorHandler::new();
    let source = "<?php\n$x = ;\n";
    let record = handler.record(
        ErrorCategory::Parsing,
        "syntax error, unexpected ';' on line 2",
        &ErrorContext {
            line: Some(2),
            ..ErrorContext::new(Path::new("x.php")).with_source(source)
        },
    );
    let v = record.to_violation();
    assert_eq!(v.category, "error.parsing");
    assert_eq!(v.line, 2);
    assert_eq!(v.bad_code, "$x = ;");
    assert_eq!(v.suggested_fix, "Check for syntax errors around the reported line");
}
