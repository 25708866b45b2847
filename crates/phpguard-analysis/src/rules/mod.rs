//! Rule trait and the built-in rules.

pub mod architecture;
pub mod base;
pub mod best_practices;
pub mod registry;
pub mod style;
pub mod support;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use phpguard_core::errors::RuleError;
use phpguard_core::types::metadata::{ConfigOption, RuleMetadata};
use phpguard_core::types::violation::{Severity, Violation};

use crate::engine::context::EngineContext;
use crate::parsers::ast::ParsedTree;

pub use architecture::ArchitectureRule;
pub use best_practices::BestPracticesRule;
pub use registry::{RuleFactory, RuleOptions, RuleRegistry};
pub use style::StyleRule;

/// A self-contained check over one parsed PHP file.
///
/// Implementors supply metadata and [`Rule::perform_checks`]; the provided
/// [`Rule::check`] handles I/O, caching, timing and failure isolation.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    /// Inspect `tree` and return violations in discovery order.
    fn perform_checks(&self, tree: &ParsedTree, path: &Path) -> Result<Vec<Violation>, RuleError>;

    /// Check the file at `path`. Never fails: every failure is logged in
    /// `ctx` and yields an empty result.
    fn check(&self, path: &Path, ctx: &EngineContext) -> Vec<Violation> {
        base::run_check(self, path, ctx)
    }

    fn id(&self) -> &str {
        &self.metadata().id
    }

    /// Concrete type name, used as the metrics key.
    fn type_name(&self) -> &str {
        &self.metadata().type_name
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn category(&self) -> &str {
        &self.metadata().category
    }

    fn severity(&self) -> Severity {
        self.metadata().severity
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.metadata().tags
    }

    fn is_enabled_by_default(&self) -> bool {
        self.metadata().enabled_by_default
    }

    fn configuration_options(&self) -> &BTreeMap<String, ConfigOption> {
        &self.metadata().configuration_options
    }
}
