//! File discovery configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra gitignore-style patterns excluded from discovery.
    pub exclude: Vec<String>,
    /// File extensions treated as PHP. Default: ["php"].
    pub extensions: Vec<String>,
    /// Follow symbolic links while walking. Default: false.
    pub follow_symlinks: Option<bool>,
}

impl ScanConfig {
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            vec!["php".to_string()]
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        }
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }
}
