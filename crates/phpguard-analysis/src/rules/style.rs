//! Naming-convention checks.

use std::path::Path;

use phpguard_core::errors::{ConfigError, RuleError};
use phpguard_core::types::metadata::{OptionType, RuleMetadata};
use phpguard_core::types::violation::{Severity, Violation};
use regex::Regex;
use serde_json::json;

use super::registry::RuleOptions;
use super::support::{option_bool, option_string};
use super::Rule;
use crate::parsers::ast::{NodeKind, ParsedTree};

const ID: &str = "style";
const PASCAL_CASE: &str = r"^[A-Z][A-Za-z0-9]*$";
const CAMEL_CASE: &str = r"^[a-z][A-Za-z0-9]*$";
const UPPER_SNAKE_CASE: &str = r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$";

/// Compiled naming patterns.
struct NamingPatterns {
    class: Regex,
    method: Regex,
    constant: Regex,
}

impl NamingPatterns {
    fn compile(class: &str, method: &str, constant: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            class: compile("class_pattern", class)?,
            method: compile("method_pattern", method)?,
            constant: compile("constant_pattern", constant)?,
        })
    }
}

fn compile(key: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: format!("rules.{ID}.{key}"),
        message: e.to_string(),
    })
}

/// PascalCase types, camelCase methods, UPPER_SNAKE_CASE constants.
pub struct StyleRule {
    metadata: RuleMetadata,
    patterns: NamingPatterns,
    check_constants: bool,
}

impl StyleRule {
    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigError> {
        let patterns = NamingPatterns::compile(
            &option_string(ID, options, "class_pattern", PASCAL_CASE)?,
            &option_string(ID, options, "method_pattern", CAMEL_CASE)?,
            &option_string(ID, options, "constant_pattern", UPPER_SNAKE_CASE)?,
        )?;
        let metadata = RuleMetadata::new(
            ID,
            "StyleRule",
            "Naming Conventions",
            "Checks class, method and constant names against PSR-1 naming conventions",
            "naming",
            Severity::Warning,
        )
        .with_tags(&["style", "naming", "psr-1"])
        .with_option("check_constants", OptionType::Bool, json!(true), "Check class constants")
        .with_option("class_pattern", OptionType::String, json!(PASCAL_CASE), "Pattern for class-like names")
        .with_option("method_pattern", OptionType::String, json!(CAMEL_CASE), "Pattern for method names")
        .with_option("constant_pattern", OptionType::String, json!(UPPER_SNAKE_CASE), "Pattern for constant names");
        Ok(Self {
            metadata,
            patterns,
            check_constants: option_bool(ID, options, "check_constants", true)?,
        })
    }

    fn naming(&self, tree: &ParsedTree, path: &Path, line: u32, message: String, fix: String) -> Violation {
        self.metadata
            .violation(path, line, message)
            .bad_code(tree.line_text(line))
            .suggested_fix(fix)
            .build()
    }
}

impl Rule for StyleRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn perform_checks(&self, tree: &ParsedTree, path: &Path) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for node in tree.root().descendants() {
            match &node.kind {
                kind if kind.is_class_like() => {
                    let name = kind.name().unwrap_or_default();
                    if !name.is_empty() && !self.patterns.class.is_match(name) {
                        violations.push(self.naming(
                            tree,
                            path,
                            node.line,
                            format!("{} name '{name}' should be in PascalCase", kind_label(kind)),
                            format!("Rename to {}", to_pascal_case(name)),
                        ));
                    }
                }
                NodeKind::Method { name, .. } => {
                    if !name.starts_with("__") && !self.patterns.method.is_match(name) {
                        violations.push(self.naming(
                            tree,
                            path,
                            node.line,
                            format!("Method name '{name}' should be in camelCase"),
                            format!("Rename to {}", to_camel_case(name)),
                        ));
                    }
                }
                NodeKind::ClassConstant { name } if self.check_constants => {
                    if !name.is_empty() && !self.patterns.constant.is_match(name) {
                        violations.push(self.naming(
                            tree,
                            path,
                            node.line,
                            format!("Constant name '{name}' should be in UPPER_SNAKE_CASE"),
                            format!("Rename to {}", to_upper_snake_case(name)),
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(violations)
    }
}

fn kind_label(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Interface { .. } => "Interface",
        NodeKind::Trait { .. } => "Trait",
        NodeKind::Enum { .. } => "Enum",
        _ => "Class",
    }
}

/// Split an identifier into lower-cased words on `_` and case changes.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_pascal_case(name: &str) -> String {
    words(name).iter().map(|w| capitalize(w)).collect()
}

fn to_camel_case(name: &str) -> String {
    let pascal = to_pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_upper_snake_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::php::PhpParser;

    fn check(src: &str) -> Vec<Violation> {
        let tree = PhpParser::new().parse(src).unwrap();
        StyleRule::from_options(&RuleOptions::new())
            .unwrap()
            .perform_checks(&tree, Path::new("src/a.php"))
            .unwrap()
    }

    #[test]
    fn lowercase_class_needs_pascal_case() {
        let v = check("<?php\nclass userController {}\n");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("PascalCase"));
        assert_eq!(v[0].category, "naming");
        assert_eq!(v[0].severity, Severity::Warning);
        assert_eq!(v[0].suggested_fix, "Rename to UserController");
    }

    #[test]
    fn uppercase_method_needs_camel_case() {
        let v = check("<?php\nclass UserController {\n    public function GetUser() {}\n    public function __construct() {}\n}\n");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("camelCase"));
        assert_eq!(v[0].line, 3);
        assert_eq!(v[0].suggested_fix, "Rename to getUser");
    }

    #[test]
    fn constants_can_be_switched_off() {
        let src = "<?php\nclass A {\n    const maxSize = 3;\n    const MAX_SIZE = 3;\n}\n";
        let v = check(src);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].suggested_fix, "Rename to MAX_SIZE");

        let mut options = RuleOptions::new();
        options.insert("check_constants".into(), json!(false));
        let tree = PhpParser::new().parse(src).unwrap();
        let rule = StyleRule::from_options(&options).unwrap();
        assert!(rule.perform_checks(&tree, Path::new("a.php")).unwrap().is_empty());
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let mut options = RuleOptions::new();
        options.insert("class_pattern".into(), json!("(unclosed"));
        assert!(StyleRule::from_options(&options).is_err());
    }

    #[test]
    fn case_conversions() {
        assert_eq!(to_pascal_case("user_controller"), "UserController");
        assert_eq!(to_camel_case("GetUser"), "getUser");
        assert_eq!(to_upper_snake_case("maxRetryCount"), "MAX_RETRY_COUNT");
    }
}
