//! AST cache configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the AST cache.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached trees. Default: 100.
    pub max_entries: Option<usize>,
    /// Seconds before an entry is treated as stale. Default: 300.
    pub ttl_seconds: Option<u64>,
    /// Whether parsed trees are cached at all. Default: true.
    pub enabled: Option<bool>,
}

impl CacheConfig {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;
    pub const DEFAULT_TTL_SECONDS: u64 = 300;

    pub fn effective_max_entries(&self) -> usize {
        self.max_entries.unwrap_or(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn effective_ttl_seconds(&self) -> u64 {
        self.ttl_seconds.unwrap_or(Self::DEFAULT_TTL_SECONDS)
    }

    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}
