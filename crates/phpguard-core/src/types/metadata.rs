//! Static, per-rule-type metadata.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::violation::{Severity, Violation, ViolationBuilder};

/// Declared type of a rule configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Bool,
    Integer,
    String,
    Array,
}

/// One configurable knob on a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub default: serde_json::Value,
    pub description: String,
}

/// Describes a rule type. Built once per rule instance and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Stable identifier used in configuration (e.g. `best_practices`).
    pub id: String,
    /// Concrete rule type name (e.g. `BestPracticesRule`); keys performance records.
    pub type_name: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub severity: Severity,
    pub tags: BTreeSet<String>,
    pub enabled_by_default: bool,
    pub configuration_options: BTreeMap<String, ConfigOption>,
}

impl RuleMetadata {
    pub fn new(
        id: &str,
        type_name: &str,
        name: &str,
        description: &str,
        category: &str,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.to_string(),
            type_name: type_name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            severity,
            tags: BTreeSet::new(),
            enabled_by_default: true,
            configuration_options: BTreeMap::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    pub fn with_option(
        mut self,
        name: &str,
        option_type: OptionType,
        default: serde_json::Value,
        description: &str,
    ) -> Self {
        self.configuration_options.insert(
            name.to_string(),
            ConfigOption {
                option_type,
                default,
                description: description.to_string(),
            },
        );
        self
    }

    /// Start a violation carrying this rule's category, severity and name.
    ///
    /// Rules that report under a narrower category override it on the builder.
    pub fn violation(&self, file: &Path, line: u32, message: impl Into<String>) -> ViolationBuilder {
        Violation::builder(file, line, message, self.category.clone(), self.severity)
            .meta("rule", self.type_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_helper_inherits_category_and_severity() {
        let meta = RuleMetadata::new("style", "StyleRule", "Style", "d", "naming", Severity::Warning);
        let v = meta.violation(Path::new("a.php"), 2, "m").build();
        assert_eq!(v.category, "naming");
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.rule(), Some("StyleRule"));
    }

    #[test]
    fn options_serialize_with_type_key() {
        let meta = RuleMetadata::new("a", "A", "A", "d", "c", Severity::Info).with_option(
            "enabled",
            OptionType::Bool,
            serde_json::json!(true),
            "toggle",
        );
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["configuration_options"]["enabled"]["type"], "bool");
    }
}
