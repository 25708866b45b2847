//! The shared `check` algorithm every rule runs through.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use phpguard_core::errors::RuleError;
use phpguard_core::types::violation::Violation;

use super::Rule;
use crate::engine::context::EngineContext;
use crate::engine::error_handler::{ErrorCategory, ErrorContext};
use crate::engine::metrics::Phase;

/// Read, parse (through the shared cache), check and time one file.
///
/// A missing path yields nothing and logs nothing. Unreadable files, parse
/// failures, rule errors and rule panics are logged in `ctx.errors()` and
/// yield an empty result.
pub fn run_check<R: Rule + ?Sized>(rule: &R, path: &Path, ctx: &EngineContext) -> Vec<Violation> {
    if !path.exists() {
        return Vec::new();
    }
    let rule_type = rule.type_name();

    // Legacy PHP is often Latin-1; invalid UTF-8 is replaced rather than rejected.
    let content = match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(source) => {
            let err = RuleError::FileAccess {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!(rule = rule_type, file = %path.display(), error = %err, "cannot read file");
            ctx.errors()
                .handle(&err, &ErrorContext::new(path).with_rule(rule_type));
            return Vec::new();
        }
    };
    let error_ctx = ErrorContext::new(path)
        .with_rule(rule_type)
        .with_source(&content);

    let started = Instant::now();
    let parsed = ctx.cache().get_or_parse(path, &content);
    ctx.metrics().record(rule_type, Phase::Parse, started.elapsed());
    let cached = match parsed {
        Ok(cached) => cached,
        Err(err) => {
            tracing::warn!(rule = rule_type, file = %path.display(), error = %err, "parse failed");
            ctx.errors().handle(&RuleError::Parse(err), &error_ctx);
            ctx.metrics().record(rule_type, Phase::Total, started.elapsed());
            return Vec::new();
        }
    };
    ctx.metrics().record_cache_access(cached.lookup);

    let check_started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        rule.perform_checks(&cached.tree, path)
    }));
    let check_time = check_started.elapsed();
    ctx.metrics().record(rule_type, Phase::Check, check_time);
    ctx.metrics().record(rule_type, Phase::Total, started.elapsed());

    let violations = match outcome {
        Ok(Ok(violations)) => violations,
        Ok(Err(err)) => {
            tracing::warn!(rule = rule_type, file = %path.display(), error = %err, "rule failed");
            ctx.errors().handle(&err, &error_ctx);
            Vec::new()
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(rule = rule_type, file = %path.display(), message = %message, "rule panicked during check");
            ctx.errors().handle_panic(&message, &error_ctx);
            Vec::new()
        }
    };

    let threshold_ms = ctx.limits().effective_slow_rule_threshold_ms();
    let elapsed_ms = check_time.as_millis() as u64;
    if elapsed_ms > threshold_ms {
        tracing::warn!(rule = rule_type, file = %path.display(), elapsed_ms, threshold_ms, "slow rule");
        ctx.errors().record(
            ErrorCategory::Performance,
            format!("{rule_type} took {elapsed_ms}ms (threshold {threshold_ms}ms)"),
            &error_ctx,
        );
    }

    violations
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
