//! Engine configuration, loaded from `phpguard.toml`.

mod cache_config;
mod performance_config;
mod runner_config;
mod scan_config;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use performance_config::PerformanceConfig;
pub use runner_config::RunnerConfig;
pub use scan_config::ScanConfig;

use crate::errors::ConfigError;

/// File name looked up by [`EngineConfig::load`].
pub const CONFIG_FILE_NAME: &str = "phpguard.toml";

/// Upper bound on worker threads accepted by validation.
const MAX_THREADS: usize = 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub performance: PerformanceConfig,
    pub runner: RunnerConfig,
    pub scan: ScanConfig,
    /// Free-form per-rule options, keyed by rule identifier.
    pub rules: BTreeMap<String, serde_json::Value>,
}

impl EngineConfig {
    /// Parse a TOML document. An empty document yields the defaults.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::InvalidValue {
            field: "<root>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load `phpguard.toml` from `root`, or `explicit` when given.
    ///
    /// A missing default file is not an error: defaults are returned.
    /// A missing explicit file is.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => root.join(CONFIG_FILE_NAME),
        };

        if !path.exists() {
            if explicit.is_some() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural constraints a run cannot proceed without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.effective_max_entries() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "cache.max_entries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.performance.effective_max_file_size() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "performance.max_file_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.runner.effective_threads() > MAX_THREADS {
            return Err(ConfigError::ValidationFailed {
                field: "runner.threads".to_string(),
                message: format!("must be at most {MAX_THREADS}"),
            });
        }
        if let Some(pos) = self.runner.rules.iter().position(|r| r.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("runner.rules[{pos}]"),
                message: "rule identifier must not be empty".to_string(),
            });
        }
        if let Some(pos) = self.scan.exclude.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("scan.exclude[{pos}]"),
                message: "pattern must not be empty".to_string(),
            });
        }
        for (id, options) in &self.rules {
            if !options.is_object() {
                return Err(ConfigError::InvalidValue {
                    field: format!("rules.{id}"),
                    message: "rule options must be a table".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Options configured for `rule_id`, if any.
    pub fn rule_options(&self, rule_id: &str) -> Option<&serde_json::Value> {
        self.rules.get(rule_id)
    }
}
