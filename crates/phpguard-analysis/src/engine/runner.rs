//! RuleRunner: loads rules, drives files × rules, aggregates violations.
//!
//! Ordering is files in input order (outer), rules in load order (inner),
//! then each rule's discovery order. Parallel mode keeps that order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use phpguard_core::config::{EngineConfig, CONFIG_FILE_NAME};
use phpguard_core::errors::{ConfigError, RuleError};
use phpguard_core::types::violation::Violation;

use super::context::EngineContext;
use super::error_handler::{ErrorContext, ErrorReport};
use super::metrics::RuleTiming;
use crate::cache::CacheStats;
use crate::rules::registry::RuleRegistry;
use crate::rules::Rule;
use crate::scanner;

/// `(completed_steps, total_steps, message)`, invoked after every (file, rule) unit.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunState {
    Idle,
    Loading,
    Scanning,
    Done,
}

/// Everything a reporter needs after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub violations: Vec<Violation>,
    pub error_report: ErrorReport,
    pub cache_stats: CacheStats,
    pub rule_timings: Vec<RuleTiming>,
    pub files_scanned: usize,
    pub elapsed: Duration,
}

pub struct RuleRunner {
    config: EngineConfig,
    registry: RuleRegistry,
    rules: Vec<Box<dyn Rule>>,
    context: EngineContext,
    progress: Option<ProgressCallback>,
    state: Mutex<RunState>,
}

impl RuleRunner {
    /// Runner over the built-in rules. Fails only on invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_registry(config, RuleRegistry::with_defaults())
    }

    pub fn with_registry(config: EngineConfig, registry: RuleRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = EngineContext::new(&config);
        Ok(Self {
            config,
            registry,
            rules: Vec::new(),
            context,
            progress: None,
            state: Mutex::new(RunState::Idle),
        })
    }

    /// [`RuleRunner::new`] followed by [`RuleRunner::load_configured_rules`].
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let mut runner = Self::new(config)?;
        runner.load_configured_rules();
        Ok(runner)
    }

    /// Load `runner.rules`, or every default-enabled rule when the list is empty.
    pub fn load_configured_rules(&mut self) -> usize {
        let identifiers = if self.config.runner.rules.is_empty() {
            self.registry.default_ids()
        } else {
            self.config.runner.rules.clone()
        };
        let options = self.config.rules.clone();
        self.load_rules(&identifiers, &options)
    }

    /// Replace the loaded rule set. Identifiers that do not resolve, or whose
    /// options are rejected, are logged as CONFIGURATION errors and skipped.
    ///
    /// Returns the number of rules loaded.
    pub fn load_rules(
        &mut self,
        identifiers: &[String],
        options: &BTreeMap<String, serde_json::Value>,
    ) -> usize {
        self.set_state(RunState::Loading);
        self.rules.clear();
        for identifier in identifiers {
            let rule_options = self
                .registry
                .resolve(identifier)
                .and_then(|id| options.get(id))
                .or_else(|| options.get(identifier.as_str()));
            match self.registry.create(identifier, rule_options) {
                Ok(rule) => {
                    tracing::debug!(rule = rule.id(), "rule loaded");
                    self.rules.push(rule);
                }
                Err(err) => {
                    tracing::warn!(rule = %identifier, error = %err, "skipping rule");
                    self.context.errors().handle(
                        &RuleError::Config(err),
                        &ErrorContext::new(Path::new(CONFIG_FILE_NAME)).with_rule(identifier),
                    );
                }
            }
        }
        self.rules.len()
    }

    /// Append an already constructed rule.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.set_state(RunState::Loading);
        self.rules.push(rule);
    }

    pub fn set_progress_callback(&mut self, callback: impl Fn(usize, usize, &str) + Send + Sync + 'static) {
        self.progress = Some(Box::new(callback));
    }

    /// Check every file with every loaded rule. Never fails: per-file and
    /// per-rule failures end up in the context's error logs.
    pub fn run(&self, files: &[PathBuf]) -> Vec<Violation> {
        let started = Instant::now();
        self.set_state(RunState::Scanning);
        let parallel = self.config.runner.effective_parallel() && files.len() > 1;
        let total = files.len() * self.rules.len();
        tracing::info!(files = files.len(), rules = self.rules.len(), parallel, "rule run started");

        let completed = AtomicUsize::new(0);
        let per_file: Vec<Vec<Violation>> = if parallel {
            self.scan_parallel(files, total, &completed)
        } else {
            files
                .iter()
                .map(|file| self.scan_file(file, total, &completed))
                .collect()
        };
        let violations: Vec<Violation> = per_file.into_iter().flatten().collect();

        tracing::info!(
            files = files.len(),
            rules = self.rules.len(),
            violations = violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rule run complete"
        );
        self.set_state(RunState::Done);
        violations
    }

    /// [`RuleRunner::run`] plus the diagnostics gathered in the context.
    pub fn run_report(&self, files: &[PathBuf]) -> RunReport {
        let started = Instant::now();
        let violations = self.run(files);
        RunReport {
            violations,
            error_report: self.context.errors().detailed_report(),
            cache_stats: self.context.cache().stats(),
            rule_timings: self.context.metrics().summary(),
            files_scanned: files.len(),
            elapsed: started.elapsed(),
        }
    }

    /// Discover PHP files under `root` per `[scan]`, then run over them.
    pub fn run_directory(&self, root: &Path) -> Result<RunReport, ConfigError> {
        self.set_state(RunState::Loading);
        let files = scanner::discover_files(root, &self.config.scan)?;
        Ok(self.run_report(&files))
    }

    fn scan_parallel(&self, files: &[PathBuf], total: usize, completed: &AtomicUsize) -> Vec<Vec<Violation>> {
        let scan = || {
            files
                .par_iter()
                .map(|file| self.scan_file(file, total, completed))
                .collect::<Vec<_>>()
        };
        match self.config.runner.effective_threads() {
            0 => scan(),
            threads => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(scan),
                Err(err) => {
                    tracing::warn!(threads, error = %err, "thread pool unavailable, using the global pool");
                    scan()
                }
            },
        }
    }

    fn scan_file(&self, file: &Path, total: usize, completed: &AtomicUsize) -> Vec<Violation> {
        let mut violations = Vec::new();
        let limits = self.context.limits();

        let max_size = limits.effective_max_file_size();
        if let Ok(meta) = std::fs::metadata(file) {
            if meta.is_file() && meta.len() > max_size {
                let err = RuleError::ResourceExhausted {
                    message: format!("{} is {} bytes, limit is {max_size}", file.display(), meta.len()),
                };
                tracing::warn!(file = %file.display(), size = meta.len(), max_size, "file skipped");
                self.context.errors().handle(&err, &ErrorContext::new(file));
                self.advance(
                    completed,
                    self.rules.len(),
                    total,
                    &format!("Skipped {} (too large)", file.display()),
                );
                return violations;
            }
        }

        let limit = Duration::from_millis(limits.effective_max_file_time_ms());
        let file_started = Instant::now();
        for (idx, rule) in self.rules.iter().enumerate() {
            let elapsed = file_started.elapsed();
            if idx > 0 && elapsed > limit {
                let err = RuleError::TimeLimitExceeded {
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: limit.as_millis() as u64,
                };
                tracing::warn!(file = %file.display(), skipped_rules = self.rules.len() - idx, "file time limit exceeded");
                self.context.errors().handle(&err, &ErrorContext::new(file));
                self.advance(
                    completed,
                    self.rules.len() - idx,
                    total,
                    &format!("Skipped {} (time limit)", file.display()),
                );
                break;
            }
            violations.extend(rule.check(file, &self.context));
            self.advance(
                completed,
                1,
                total,
                &format!("Checked {} with {}", file.display(), rule.name()),
            );
        }
        violations
    }

    fn advance(&self, completed: &AtomicUsize, steps: usize, total: usize, message: &str) {
        let done = completed.fetch_add(steps, Ordering::SeqCst) + steps;
        if let Some(callback) = &self.progress {
            callback(done, total, message);
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clear the cache, metrics and error logs; loaded rules are kept.
    pub fn reset(&self) {
        self.context.reset();
        self.set_state(if self.rules.is_empty() {
            RunState::Idle
        } else {
            RunState::Loading
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_runner_is_idle_and_empty() {
        let runner = RuleRunner::new(EngineConfig::default()).unwrap();
        assert_eq!(runner.state(), RunState::Idle);
        assert!(runner.rules().is_empty());
        assert!(runner.run(&[]).is_empty());
        assert_eq!(runner.state(), RunState::Done);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.cache.max_entries = Some(0);
        assert!(RuleRunner::new(config).is_err());
    }

    #[test]
    fn from_config_loads_default_rules() {
        let runner = RuleRunner::from_config(EngineConfig::default()).unwrap();
        let ids: Vec<&str> = runner.rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["best_practices", "architecture", "style"]);
        assert_eq!(runner.state(), RunState::Loading);
    }
}
