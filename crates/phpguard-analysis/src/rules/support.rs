//! Helpers shared by the built-in rules: name resolution, layer detection and
//! option parsing.

use rustc_hash::FxHashMap;
use serde_json::Value;

use phpguard_core::errors::ConfigError;

use super::registry::RuleOptions;
use crate::parsers::ast::{Node, NodeKind};

/// Names PHP resolves relative to the current class, not an import.
const RELATIVE_CLASS_NAMES: &[&str] = &["self", "static", "parent"];

/// `use` imports and the namespace of one file, for resolving class names.
#[derive(Debug, Default)]
pub struct NameResolver {
    namespace: Option<String>,
    /// Lower-cased alias → fully qualified name.
    imports: FxHashMap<String, String>,
}

impl NameResolver {
    pub fn from_tree(root: &Node) -> Self {
        let mut resolver = Self::default();
        for node in root.descendants() {
            match &node.kind {
                NodeKind::Namespace { name } if resolver.namespace.is_none() && !name.is_empty() => {
                    resolver.namespace = Some(name.trim_matches('\\').to_string());
                }
                NodeKind::Use { name, alias } => {
                    let full = name.trim_start_matches('\\').to_string();
                    let key = alias
                        .clone()
                        .unwrap_or_else(|| last_segment(&full).to_string())
                        .to_ascii_lowercase();
                    resolver.imports.insert(key, full);
                }
                _ => {}
            }
        }
        resolver
    }

    /// Fully qualified form of `name` as written in this file.
    ///
    /// Returns `None` for `self`, `static`, `parent` and empty names.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || RELATIVE_CLASS_NAMES.iter().any(|r| name.eq_ignore_ascii_case(r)) {
            return None;
        }
        if let Some(qualified) = name.strip_prefix('\\') {
            return Some(qualified.to_string());
        }
        let (head, rest) = match name.split_once('\\') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if let Some(full) = self.imports.get(&head.to_ascii_lowercase()) {
            return Some(match rest {
                Some(rest) => format!("{full}\\{rest}"),
                None => full.clone(),
            });
        }
        Some(match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        })
    }
}

pub fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Case-insensitive namespace prefix match on whole segments.
///
/// `MongoDB\` and `MongoDB` both match `MongoDB\Client` and `MongoDB`, but not
/// `MongoDBX\Client`.
pub fn in_namespace(full: &str, prefix: &str) -> bool {
    let full = full.trim_start_matches('\\');
    let prefix = prefix.trim_matches('\\');
    if prefix.is_empty() {
        return false;
    }
    match full.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => {
            full.len() == prefix.len() || full[prefix.len()..].starts_with('\\')
        }
        _ => false,
    }
}

/// Class declarations whose name ends with `suffix`.
pub fn classes_with_suffix<'a>(root: &'a Node, suffix: &str) -> Vec<&'a Node> {
    root.find_all(|n| match &n.kind {
        NodeKind::Class { name, .. } => !name.is_empty() && name.ends_with(suffix),
        _ => false,
    })
}

/// Call name without a leading `\`, lower-cased.
pub fn normalized_call_name(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_ascii_lowercase()
}

pub fn option_bool(
    rule_id: &str,
    options: &RuleOptions,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match options.get(key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(rule_id, key, format!("expected a boolean, got {other}"))),
    }
}

pub fn option_string(
    rule_id: &str,
    options: &RuleOptions,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match options.get(key) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(invalid(rule_id, key, format!("expected a string, got {other}"))),
    }
}

pub fn option_string_list(
    rule_id: &str,
    options: &RuleOptions,
    key: &str,
    default: &[&str],
) -> Result<Vec<String>, ConfigError> {
    match options.get(key) {
        None => Ok(default.iter().map(|s| s.to_string()).collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(rule_id, key, format!("expected strings, got {other}"))),
            })
            .collect(),
        Some(other) => Err(invalid(rule_id, key, format!("expected an array, got {other}"))),
    }
}

fn invalid(rule_id: &str, key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: format!("rules.{rule_id}.{key}"),
        message,
    }
}
