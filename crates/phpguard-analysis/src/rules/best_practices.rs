//! Framework best-practice checks for controllers and application code.

use std::path::Path;

use phpguard_core::errors::{ConfigError, RuleError};
use phpguard_core::types::metadata::{OptionType, RuleMetadata};
use phpguard_core::types::violation::{Severity, Violation};
use serde_json::json;

use super::registry::RuleOptions;
use super::support::{classes_with_suffix, last_segment, normalized_call_name, option_bool, option_string};
use super::Rule;
use crate::parsers::ast::{Node, NodeKind, Param, ParsedTree};

const ID: &str = "best_practices";
const DEBUG_FUNCTIONS: &[&str] = &["dd", "dump", "var_dump", "print_r"];
const VALIDATION_METHODS: &[&str] = &["validate", "validatewithbag"];
const VALIDATION_FUNCTIONS: &[&str] = &["validate", "validator"];

pub struct BestPracticesRule {
    metadata: RuleMetadata,
    controller_suffix: String,
    check_validation: bool,
    check_debug_calls: bool,
    check_env_usage: bool,
}

impl BestPracticesRule {
    pub fn new() -> Self {
        Self::with_metadata("Controller".to_string(), true, true, true)
    }

    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigError> {
        Ok(Self::with_metadata(
            option_string(ID, options, "controller_suffix", "Controller")?,
            option_bool(ID, options, "check_validation", true)?,
            option_bool(ID, options, "check_debug_calls", true)?,
            option_bool(ID, options, "check_env_usage", true)?,
        ))
    }

    fn with_metadata(
        controller_suffix: String,
        check_validation: bool,
        check_debug_calls: bool,
        check_env_usage: bool,
    ) -> Self {
        let metadata = RuleMetadata::new(
            ID,
            "BestPracticesRule",
            "Framework Best Practices",
            "Flags unvalidated request input, leftover debug output and env() outside config files",
            "best_practices",
            Severity::Warning,
        )
        .with_tags(&["laravel", "security", "maintainability"])
        .with_option("controller_suffix", OptionType::String, json!("Controller"), "Class name suffix identifying controllers")
        .with_option("check_validation", OptionType::Bool, json!(true), "Require validation of request input in controllers")
        .with_option("check_debug_calls", OptionType::Bool, json!(true), "Report dd(), dump(), var_dump() and print_r()")
        .with_option("check_env_usage", OptionType::Bool, json!(true), "Report env() calls outside config/");
        Self {
            metadata,
            controller_suffix,
            check_validation,
            check_debug_calls,
            check_env_usage,
        }
    }

    fn report_unvalidated_input(&self, tree: &ParsedTree, path: &Path, out: &mut Vec<Violation>) {
        for class in classes_with_suffix(tree.root(), &self.controller_suffix) {
            for method in class.descendants() {
                let NodeKind::Method { name, params, .. } = &method.kind else { continue };
                if !params.iter().any(is_request_param) {
                    continue;
                }
                if params.iter().any(is_form_request) || calls_validation(method) {
                    continue;
                }
                out.push(
                    self.metadata
                        .violation(path, method.line, format!("{name}() uses request input without validating it"))
                        .category("validation")
                        .severity(Severity::Warning)
                        .bad_code(tree.line_text(method.line))
                        .suggested_fix("Call $request->validate([...]) or type-hint a FormRequest subclass")
                        .build(),
                );
            }
        }
    }

    fn report_calls(&self, tree: &ParsedTree, path: &Path, out: &mut Vec<Violation>) {
        let in_config_dir = path.components().any(|c| c.as_os_str() == "config");
        for node in tree.root().descendants() {
            let NodeKind::FunctionCall { name } = &node.kind else { continue };
            let call = normalized_call_name(name);
            if self.check_debug_calls && DEBUG_FUNCTIONS.contains(&call.as_str()) {
                out.push(
                    self.metadata
                        .violation(path, node.line, format!("Debug call {call}() left in code"))
                        .category("debugging")
                        .severity(Severity::Warning)
                        .bad_code(tree.line_text(node.line))
                        .suggested_fix("Remove the debug call or use the logger")
                        .build(),
                );
            } else if self.check_env_usage && call == "env" && !in_config_dir {
                out.push(
                    self.metadata
                        .violation(path, node.line, "env() called outside a config file")
                        .category("configuration")
                        .severity(Severity::Info)
                        .bad_code(tree.line_text(node.line))
                        .suggested_fix("Read the value with config() and define it in a config/ file")
                        .build(),
                );
            }
        }
    }
}

impl Default for BestPracticesRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BestPracticesRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn perform_checks(&self, tree: &ParsedTree, path: &Path) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        if self.check_validation {
            self.report_unvalidated_input(tree, path, &mut violations);
        }
        if self.check_debug_calls || self.check_env_usage {
            self.report_calls(tree, path, &mut violations);
        }
        Ok(violations)
    }
}

fn type_base(param: &Param) -> Option<&str> {
    param
        .type_hint
        .as_deref()
        .map(|t| last_segment(t.trim().trim_start_matches('?')))
}

fn is_request_param(param: &Param) -> bool {
    param.name.eq_ignore_ascii_case("request") || type_base(param).is_some_and(|t| t.ends_with("Request"))
}

/// A typed request other than the plain `Request`: validation runs before the action.
fn is_form_request(param: &Param) -> bool {
    type_base(param).is_some_and(|t| t.ends_with("Request") && t != "Request")
}

fn calls_validation(method: &Node) -> bool {
    method.descendants().any(|n| match &n.kind {
        NodeKind::MethodCall { method } => VALIDATION_METHODS.contains(&method.to_ascii_lowercase().as_str()),
        NodeKind::FunctionCall { name } => VALIDATION_FUNCTIONS.contains(&normalized_call_name(name).as_str()),
        NodeKind::StaticCall { class, method } => {
            last_segment(class).eq_ignore_ascii_case("Validator") && method.eq_ignore_ascii_case("make")
        }
        _ => false,
    })
}
