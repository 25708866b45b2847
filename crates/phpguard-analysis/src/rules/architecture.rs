//! Forbidden-dependency checks for one architectural layer.

use std::path::Path;

use phpguard_core::errors::{ConfigError, RuleError};
use phpguard_core::types::metadata::{OptionType, RuleMetadata};
use phpguard_core::types::violation::{Severity, Violation};
use serde_json::json;

use super::registry::RuleOptions;
use super::support::{classes_with_suffix, in_namespace, option_string, option_string_list, NameResolver};
use super::Rule;
use crate::parsers::ast::{NodeKind, ParsedTree};

const ID: &str = "architecture";
const DEFAULT_FORBIDDEN: &[&str] = &["MongoDB\\"];
const DEFAULT_LAYER_SUFFIX: &str = "Controller";

/// Flags classes of a layer (controllers by default) that reach into a
/// forbidden namespace, once per `use` import and once per instantiation or
/// static call resolving into it.
pub struct ArchitectureRule {
    metadata: RuleMetadata,
    forbidden: Vec<String>,
    layer_suffix: String,
}

impl ArchitectureRule {
    pub fn new() -> Self {
        Self::with_settings(
            DEFAULT_FORBIDDEN.iter().map(|s| s.to_string()).collect(),
            DEFAULT_LAYER_SUFFIX.to_string(),
        )
    }

    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigError> {
        let forbidden = option_string_list(ID, options, "forbidden_namespaces", DEFAULT_FORBIDDEN)?;
        let layer_suffix = option_string(ID, options, "layer_suffix", DEFAULT_LAYER_SUFFIX)?;
        if layer_suffix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("rules.{ID}.layer_suffix"),
                message: "must not be empty".to_string(),
            });
        }
        Ok(Self::with_settings(forbidden, layer_suffix))
    }

    fn with_settings(forbidden: Vec<String>, layer_suffix: String) -> Self {
        let metadata = RuleMetadata::new(
            ID,
            "ArchitectureRule",
            "Layer Dependencies",
            "Keeps layers from depending directly on forbidden namespaces",
            "architecture",
            Severity::Warning,
        )
        .with_tags(&["architecture", "dependencies", "layering"])
        .with_option(
            "forbidden_namespaces",
            OptionType::Array,
            json!(DEFAULT_FORBIDDEN),
            "Namespace prefixes the layer must not depend on",
        )
        .with_option(
            "layer_suffix",
            OptionType::String,
            json!(DEFAULT_LAYER_SUFFIX),
            "Class name suffix identifying the checked layer",
        );
        Self {
            metadata,
            forbidden,
            layer_suffix,
        }
    }

    fn forbidden_prefix(&self, full: &str) -> Option<&str> {
        self.forbidden
            .iter()
            .find(|prefix| in_namespace(full, prefix))
            .map(String::as_str)
    }
}

impl Default for ArchitectureRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ArchitectureRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn perform_checks(&self, tree: &ParsedTree, path: &Path) -> Result<Vec<Violation>, RuleError> {
        let root = tree.root();
        let layer_classes = classes_with_suffix(root, &self.layer_suffix);
        if layer_classes.is_empty() || self.forbidden.is_empty() {
            return Ok(Vec::new());
        }
        let resolver = NameResolver::from_tree(root);
        // Imports are file-scoped, so they are charged to every layer class in the file.
        let owners = layer_classes
            .iter()
            .filter_map(|class| class.kind.name())
            .collect::<Vec<_>>()
            .join(", ");
        let mut violations = Vec::new();

        for node in root.descendants() {
            if let NodeKind::Use { name, .. } = &node.kind {
                let full = name.trim_start_matches('\\');
                if let Some(prefix) = self.forbidden_prefix(full) {
                    violations.push(
                        self.metadata
                            .violation(
                                path,
                                node.line,
                                format!("{owners} imports {full} from forbidden namespace {prefix}"),
                            )
                            .bad_code(tree.line_text(node.line))
                            .suggested_fix(format!(
                                "Depend on an abstraction (repository or service) instead of {full}"
                            ))
                            .meta("dependency", full)
                            .meta("usage", "import")
                            .build(),
                    );
                }
            }
        }

        for class in layer_classes {
            let class_name = class.kind.name().unwrap_or_default();
            for node in class.descendants() {
                let (written, usage) = match &node.kind {
                    NodeKind::New { class } => (class.as_str(), "instantiation"),
                    NodeKind::StaticCall { class, .. } => (class.as_str(), "static call"),
                    _ => continue,
                };
                let Some(full) = resolver.resolve(written) else { continue };
                let Some(prefix) = self.forbidden_prefix(&full) else { continue };
                violations.push(
                    self.metadata
                        .violation(
                            path,
                            node.line,
                            format!("{class_name} uses {full} directly ({usage}) from forbidden namespace {prefix}"),
                        )
                        .bad_code(tree.line_text(node.line))
                        .suggested_fix("Inject the dependency through the constructor behind an interface")
                        .meta("dependency", full)
                        .meta("usage", usage)
                        .build(),
                );
            }
        }

        Ok(violations)
    }
}
