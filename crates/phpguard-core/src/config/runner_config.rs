//! Rule runner configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Ordered rule identifiers. Empty = every rule enabled by default.
    pub rules: Vec<String>,
    /// Process files on the rayon pool. Default: false.
    pub parallel: Option<bool>,
    /// Worker threads for parallel mode. 0 = rayon default.
    pub threads: Option<usize>,
}

impl RunnerConfig {
    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(false)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }
}
