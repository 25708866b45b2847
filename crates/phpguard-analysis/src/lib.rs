//! # phpguard-analysis
//!
//! Rule execution engine for phpguard.
//! Turns a file path into a cached PHP syntax tree, dispatches it through an
//! ordered set of rules with per-rule timing and failure isolation, and
//! aggregates the resulting violations. [`scanner`] discovers the PHP files
//! of a project root.

#![allow(clippy::module_inception)]

pub mod cache;
pub mod engine;
pub mod parsers;
pub mod rules;
pub mod scanner;

pub use cache::{AstCache, CacheLookup, CacheStats};
pub use engine::context::EngineContext;
pub use engine::error_handler::{ErrorCategory, ErrorHandler, ErrorRecord};
pub use engine::metrics::{PerformanceMetrics, Phase};
pub use engine::runner::{RuleRunner, RunReport, RunState};
pub use parsers::ast::{Node, NodeKind, ParsedTree};
pub use parsers::php::PhpParser;
pub use rules::registry::RuleRegistry;
pub use rules::Rule;
pub use scanner::discover_files;
