//! Resource ceilings enforced by the runner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Files larger than this many bytes are skipped. Default: 1MB (1_048_576).
    pub max_file_size: Option<u64>,
    /// Cumulative rule time allowed per file, in milliseconds. Default: 10_000.
    pub max_file_time_ms: Option<u64>,
    /// A single rule check slower than this is logged as a warning. Default: 1_000.
    pub slow_rule_threshold_ms: Option<u64>,
}

impl PerformanceConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1_048_576)
    }

    pub fn effective_max_file_time_ms(&self) -> u64 {
        self.max_file_time_ms.unwrap_or(10_000)
    }

    pub fn effective_slow_rule_threshold_ms(&self) -> u64 {
        self.slow_rule_threshold_ms.unwrap_or(1_000)
    }
}
