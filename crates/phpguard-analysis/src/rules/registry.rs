//! RuleRegistry: stable identifiers → rule factories.

use serde_json::Value;

use phpguard_core::errors::ConfigError;

use super::architecture::ArchitectureRule;
use super::best_practices::BestPracticesRule;
use super::style::StyleRule;
use super::Rule;

/// Free-form options handed to a rule factory (`[rules.<id>]` table).
pub type RuleOptions = serde_json::Map<String, Value>;

/// Builds a rule from its options.
pub type RuleFactory = fn(&RuleOptions) -> Result<Box<dyn Rule>, ConfigError>;

struct Registration {
    id: String,
    type_name: String,
    factory: RuleFactory,
}

/// Registration-time table of every rule the runner can load.
///
/// An identifier resolves when it equals a rule's id (`style`), its type name
/// (`StyleRule`), or is a path ending in the type name (`rules::StyleRule`,
/// `App\Rules\StyleRule`).
pub struct RuleRegistry {
    registrations: Vec<Registration>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Registry holding the built-in rules.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("best_practices", "BestPracticesRule", best_practices);
        registry.register("architecture", "ArchitectureRule", architecture);
        registry.register("style", "StyleRule", style);
        registry
    }

    /// Register a factory. A later registration with the same id replaces the earlier one.
    pub fn register(&mut self, id: &str, type_name: &str, factory: RuleFactory) {
        self.registrations.retain(|r| r.id != id);
        self.registrations.push(Registration {
            id: id.to_string(),
            type_name: type_name.to_string(),
            factory,
        });
    }

    fn find(&self, identifier: &str) -> Option<&Registration> {
        let identifier = identifier.trim();
        let tail = identifier
            .rsplit(|c: char| c == '\\' || c == ':')
            .next()
            .unwrap_or(identifier);
        self.registrations
            .iter()
            .find(|r| r.id == identifier || r.type_name == identifier)
            .or_else(|| self.registrations.iter().find(|r| r.type_name == tail))
    }

    /// Canonical id for `identifier`, if it resolves.
    pub fn resolve(&self, identifier: &str) -> Option<&str> {
        self.find(identifier).map(|r| r.id.as_str())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// Instantiate the rule for `identifier` with optional `[rules.<id>]` options.
    pub fn create(&self, identifier: &str, options: Option<&Value>) -> Result<Box<dyn Rule>, ConfigError> {
        let registration = self.find(identifier).ok_or_else(|| ConfigError::UnknownRule {
            identifier: identifier.to_string(),
        })?;
        let options = match options {
            None | Some(Value::Null) => RuleOptions::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: format!("rules.{}", registration.id),
                    message: format!("expected a table of options, got {other}"),
                })
            }
        };
        (registration.factory)(&options)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.id.as_str()).collect()
    }

    /// Ids of rules enabled by default, in registration order.
    pub fn default_ids(&self) -> Vec<String> {
        let empty = RuleOptions::new();
        self.registrations
            .iter()
            .filter(|r| {
                (r.factory)(&empty)
                    .map(|rule| rule.is_enabled_by_default())
                    .unwrap_or(false)
            })
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

fn best_practices(options: &RuleOptions) -> Result<Box<dyn Rule>, ConfigError> {
    Ok(Box::new(BestPracticesRule::from_options(options)?))
}

fn architecture(options: &RuleOptions) -> Result<Box<dyn Rule>, ConfigError> {
    Ok(Box::new(ArchitectureRule::from_options(options)?))
}

fn style(options: &RuleOptions) -> Result<Box<dyn Rule>, ConfigError> {
    Ok(Box::new(StyleRule::from_options(options)?))
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_id_type_name_and_path() {
        let registry = RuleRegistry::with_defaults();
        assert_eq!(registry.resolve("style"), Some("style"));
        assert_eq!(registry.resolve("StyleRule"), Some("style"));
        assert_eq!(registry.resolve("App\\Rules\\ArchitectureRule"), Some("architecture"));
        assert_eq!(registry.resolve("rules::BestPracticesRule"), Some("best_practices"));
        assert_eq!(registry.resolve("NoSuchRule"), None);
    }

    #[test]
    fn unknown_identifier_is_a_config_error() {
        let registry = RuleRegistry::with_defaults();
        let err = registry.create("NoSuchRule", None).err();
        assert!(matches!(err, Some(ConfigError::UnknownRule { .. })));
    }

    #[test]
    fn non_table_options_are_rejected() {
        let registry = RuleRegistry::with_defaults();
        let err = registry.create("style", Some(&json!(3))).err();
        assert!(matches!(err, Some(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn defaults_follow_registration_order() {
        let registry = RuleRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["best_practices", "architecture", "style"]);
        assert_eq!(registry.default_ids(), vec!["best_practices", "architecture", "style"]);
    }
}
